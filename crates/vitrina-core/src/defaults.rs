//! Centralized default constants for the vitrina catalog.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page number.
pub const PAGE: u32 = 1;

/// Default page size for the browse endpoint.
pub const PER_PAGE: u32 = 20;

/// Largest page size the browse endpoint accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Number of page links shown around the current page.
pub const PAGE_WINDOW: u32 = 5;

// =============================================================================
// CATEGORY TREE
// =============================================================================

/// Indent unit prepended once per level below the root in flattened labels.
pub const CATEGORY_INDENT: &str = "  ";

/// Recursion bound when flattening category trees.
pub const MAX_CATEGORY_DEPTH: usize = 32;

// =============================================================================
// PRESENTATION
// =============================================================================

/// Currency used when an item carries none.
pub const CURRENCY: &str = "RSD";

/// Separator between thousands groups in the non-localized formatter.
pub const THOUSANDS_SEPARATOR: &str = " ";

/// Separator between the bounds of a price range.
pub const RANGE_SEPARATOR: &str = " – ";

// =============================================================================
// CLIENT
// =============================================================================

/// Default catalog API base URL.
pub const API_BASE: &str = "http://localhost:8081";

/// Default tenant identifier.
pub const TENANT_ID: &str = "default";

/// HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Facet schema cache TTL in seconds (0 disables caching).
pub const SCHEMA_TTL_SECS: u64 = 60;
