//! # vitrina-core
//!
//! Core types, traits, and pure logic for the vitrina catalog engine.
//!
//! A catalog page is driven by a tenant/domain facet schema: the schema says
//! which filter dimensions exist, the [`gate`] decides which controls render
//! and which query parameters may be sent, and the [`query`] codec keeps the
//! browse state in URL parameters. Everything here is synchronous and free of
//! I/O except the collaborator traits in [`traits`].
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded page, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration (tree nodes, list entries) |

pub mod category_tree;
pub mod defaults;
pub mod error;
pub mod gate;
pub mod models;
pub mod pagination;
pub mod presenter;
pub mod query;
pub mod traits;

// Re-export commonly used types at crate root
pub use category_tree::{flatten, normalize_tree_payload};
pub use error::{Error, Result};
pub use gate::{FacetSet, GateRule, VisibleControl, GATE_RULES};
pub use models::*;
pub use pagination::{window, PageWindow};
pub use presenter::{format_price, price_display, PlainFormatter, PriceFormatter};
pub use query::QueryParams;
pub use traits::*;
