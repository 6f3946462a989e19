//! Collaborator traits for the catalog engine.
//!
//! Every remote dependency of a catalog page sits behind one of these traits so
//! the page service can be driven by HTTP clients in production and by
//! in-memory fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::*;
use crate::query::QueryParams;

// =============================================================================
// SCHEMA & TAXONOMY
// =============================================================================

/// Source of tenant/domain facet schemas.
#[async_trait]
pub trait FacetSchemaSource: Send + Sync {
    /// Fetch the schema for a domain.
    ///
    /// Failures are reported as `SchemaUnavailable`; callers fail closed.
    async fn facet_schema(&self, domain: Domain, tenant_id: &str) -> Result<FacetSchema>;

    /// Hint that the schema for `product_type` will be needed soon.
    ///
    /// Sources without a cache ignore it.
    fn prefetch(&self, _product_type: ProductType, _tenant_id: &str) {}
}

/// Source of the hierarchical category tree.
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// Fetch the tree roots, with names resolved for `locale` when given.
    async fn category_tree(&self, locale: Option<&str>) -> Result<Vec<CategoryNode>>;
}

/// Source of the city directory.
#[async_trait]
pub trait CitySource: Send + Sync {
    async fn cities(&self) -> Result<Vec<City>>;
}

// =============================================================================
// CATALOG
// =============================================================================

/// Browse endpoint.
#[async_trait]
pub trait BrowseBackend: Send + Sync {
    /// Run a browse request with already-gated parameters.
    async fn browse(&self, params: &QueryParams) -> Result<BrowsePage>;
}

/// Reporting window for price history charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePeriod {
    Day,
    Week,
    #[default]
    Month,
    HalfYear,
    Year,
}

impl PricePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricePeriod::Day => "day",
            PricePeriod::Week => "week",
            PricePeriod::Month => "month",
            PricePeriod::HalfYear => "half_year",
            PricePeriod::Year => "year",
        }
    }

    /// Parse a request parameter; unknown values fall back to the default.
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "day" => PricePeriod::Day,
            "week" => PricePeriod::Week,
            "half_year" => PricePeriod::HalfYear,
            "year" => PricePeriod::Year,
            _ => PricePeriod::Month,
        }
    }
}

/// Price history for a single product. The payload is passed through opaque.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn price_history(
        &self,
        product_id: &str,
        period: PricePeriod,
        locale: Option<&str>,
    ) -> Result<JsonValue>;
}
