//! Core data models for the vitrina catalog.
//!
//! All types here are plain serde data: they are exchanged with the HTTP
//! collaborators and handed unchanged to the rendering layer.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::defaults;
use crate::error::Error;
use crate::query;

// =============================================================================
// DOMAIN & PRODUCT TYPE
// =============================================================================

/// Product taxonomy partition that selects a facet schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Goods,
    Services,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Goods, Domain::Services];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Goods => "goods",
            Domain::Services => "services",
        }
    }

    /// Domain whose schema governs a product type filter.
    ///
    /// Only an explicit `service` selects the services schema.
    pub fn for_product_type(product_type: ProductType) -> Self {
        match product_type {
            ProductType::Service => Domain::Services,
            ProductType::Good | ProductType::Any => Domain::Goods,
        }
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "goods" => Ok(Domain::Goods),
            "services" => Ok(Domain::Services),
            other => Err(Error::InvalidDomain(other.to_string())),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product type filter carried by a browse query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "service")]
    Service,
    /// No product type restriction.
    #[default]
    #[serde(rename = "")]
    Any,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Good => "good",
            ProductType::Service => "service",
            ProductType::Any => "",
        }
    }

    /// Parse a request parameter; unknown values mean "no restriction".
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "good" => ProductType::Good,
            "service" => ProductType::Service,
            _ => ProductType::Any,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FACET SCHEMA
// =============================================================================

/// Control shape a facet requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetType {
    /// Bounded numeric range.
    Range,
    /// Discrete choice set.
    Enum,
}

/// One filterable dimension declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDefinition {
    pub semantic_type: String,
    pub facet_type: FacetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl FacetDefinition {
    pub fn new(semantic_type: impl Into<String>, facet_type: FacetType) -> Self {
        Self {
            semantic_type: semantic_type.into(),
            facet_type,
            values: None,
        }
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Tenant/domain specific facet schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSchema {
    pub domain: Domain,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub facets: Vec<FacetDefinition>,
}

impl FacetSchema {
    pub fn new(domain: Domain, tenant_id: impl Into<String>) -> Self {
        Self {
            domain,
            tenant_id: tenant_id.into(),
            facets: Vec::new(),
        }
    }

    pub fn with_facet(mut self, facet: FacetDefinition) -> Self {
        self.facets.push(facet);
        self
    }

    /// Enforce the per-schema invariants.
    ///
    /// Semantic types are trimmed and lower-cased, empty ones are dropped, and
    /// only the first definition of a duplicated semantic type survives.
    pub fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        let domain = self.domain;
        self.facets = self
            .facets
            .into_iter()
            .filter_map(|mut facet| {
                facet.semantic_type = facet.semantic_type.trim().to_lowercase();
                if facet.semantic_type.is_empty() {
                    warn!(domain = %domain, "Dropping facet with empty semantic_type");
                    return None;
                }
                if !seen.insert(facet.semantic_type.clone()) {
                    warn!(
                        domain = %domain,
                        semantic_type = %facet.semantic_type,
                        "Dropping duplicate facet definition"
                    );
                    return None;
                }
                Some(facet)
            })
            .collect();
        self
    }

    pub fn facet(&self, semantic_type: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.semantic_type == semantic_type)
    }

    /// Declared semantic types in schema order.
    pub fn semantic_types(&self) -> impl Iterator<Item = &str> {
        self.facets.iter().map(|f| f.semantic_type.as_str())
    }
}

// =============================================================================
// CATEGORY TREE
// =============================================================================

fn default_true() -> bool {
    true
}

/// Node of the hierarchical category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub code: String,
    /// Locale-resolved display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "name_sr", alias = "name_fallback")]
    pub name_fallback: String,
    /// Declared depth, 1 for top-level nodes. Zero when the payload omits it.
    #[serde(default)]
    pub level: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: slug.into(),
            code: String::new(),
            name: Some(name.clone()),
            name_fallback: name,
            level: 1,
            is_active: true,
            sort_order: 0,
            children: Vec::new(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_child(mut self, child: CategoryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Resolved display name, falling back when the locale name is blank.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.name_fallback,
        }
    }
}

/// Flattened category entry for selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
    pub level: u32,
}

// =============================================================================
// CITIES
// =============================================================================

/// City record from the cities endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: String,
    pub slug: String,
    #[serde(rename = "name_sr", alias = "name")]
    pub name: String,
    #[serde(default, rename = "region_sr", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Selectable city for the location control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityOption {
    pub value: String,
    pub label: String,
}

/// Active cities as options, stably ordered by `sort_order`.
pub fn city_options(cities: &[City]) -> Vec<CityOption> {
    let mut active: Vec<&City> = cities.iter().filter(|c| c.is_active).collect();
    active.sort_by_key(|c| c.sort_order);
    active
        .into_iter()
        .map(|c| CityOption {
            value: c.slug.clone(),
            label: c.name.clone(),
        })
        .collect()
}

// =============================================================================
// BROWSE QUERY
// =============================================================================

/// Result ordering accepted by the browse endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowseSort {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl BrowseSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseSort::PriceAsc => "price_asc",
            BrowseSort::PriceDesc => "price_desc",
            BrowseSort::NameAsc => "name_asc",
            BrowseSort::NameDesc => "name_desc",
        }
    }

    /// Parse a request parameter; unknown values fall back to the default.
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "price_desc" => BrowseSort::PriceDesc,
            "name_asc" => BrowseSort::NameAsc,
            "name_desc" => BrowseSort::NameDesc,
            _ => BrowseSort::PriceAsc,
        }
    }
}

impl fmt::Display for BrowseSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured browse request.
///
/// Built fresh from request parameters; absent fields are defaults, never
/// "present but unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub sort: BrowseSort,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            text_query: None,
            category: None,
            brand: None,
            city: None,
            product_type: ProductType::Any,
            min_price: None,
            max_price: None,
            min_duration: None,
            max_duration: None,
            page: defaults::PAGE,
            per_page: defaults::PER_PAGE,
            sort: BrowseSort::PriceAsc,
        }
    }
}

/// Trimmed text, or `None` when blank.
fn clean_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

fn is_valid_bound(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl BrowseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_query = clean_text(text.into());
        self.page = defaults::PAGE;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = clean_text(category.into());
        self.page = defaults::PAGE;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = clean_text(brand.into());
        self.page = defaults::PAGE;
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = clean_text(city.into());
        self.page = defaults::PAGE;
        self
    }

    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self.page = defaults::PAGE;
        self
    }

    /// Negative and non-finite bounds are treated as unset.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min.filter(|v| is_valid_bound(*v));
        self.max_price = max.filter(|v| is_valid_bound(*v));
        self.page = defaults::PAGE;
        self
    }

    pub fn with_duration_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_duration = min;
        self.max_duration = max;
        self.page = defaults::PAGE;
        self
    }

    pub fn with_sort(mut self, sort: BrowseSort) -> Self {
        self.sort = sort;
        self.page = defaults::PAGE;
        self
    }

    /// Same filters, different page. Zero is treated as the first page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn reset_page(self) -> Self {
        self.with_page(defaults::PAGE)
    }

    /// Page size, clamped to `1..=MAX_PER_PAGE`.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, defaults::MAX_PER_PAGE);
        self.page = defaults::PAGE;
        self
    }

    /// Clear the field carried by a facet-owned parameter.
    ///
    /// Returns `false` when `param` names no clearable field.
    pub fn clear_param(&mut self, param: &str) -> bool {
        match param {
            query::param::CATEGORY => self.category = None,
            query::param::BRAND => self.brand = None,
            query::param::CITY => self.city = None,
            query::param::MIN_PRICE => self.min_price = None,
            query::param::MAX_PRICE => self.max_price = None,
            query::param::MIN_DURATION => self.min_duration = None,
            query::param::MAX_DURATION => self.max_duration = None,
            _ => return false,
        }
        true
    }

    /// Whether any filter or ordering differs from the reset state.
    pub fn has_active_filters(&self) -> bool {
        self.text_query.is_some()
            || self.category.is_some()
            || self.brand.is_some()
            || self.city.is_some()
            || self.product_type != ProductType::Any
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.min_duration.is_some()
            || self.max_duration.is_some()
            || self.sort != BrowseSort::PriceAsc
    }

    /// Domain whose schema governs this query.
    pub fn domain(&self) -> Domain {
        Domain::for_product_type(self.product_type)
    }
}

// =============================================================================
// BROWSE RESULTS
// =============================================================================

/// Discriminator between goods and services listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Good,
    Service,
}

/// Service-only listing details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
}

/// One listing in a browse page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shops_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_names: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_metadata: Option<ServiceMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deliverable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_onsite: Option<bool>,
}

impl CatalogItem {
    pub fn good(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: ItemType::Good,
            ..Default::default()
        }
    }

    pub fn service(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: ItemType::Service,
            ..Default::default()
        }
    }

    pub fn with_prices(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn is_service(&self) -> bool {
        self.item_type == ItemType::Service
    }
}

/// One page of browse results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsePage {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
}

impl BrowsePage {
    /// Empty result page, used when the browse endpoint fails.
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            page: page.max(1),
            per_page: per_page.max(1),
            total: 0,
            total_pages: 0,
        }
    }

    /// `ceil(total / per_page)`, or 0 when there are no results.
    pub fn expected_total_pages(total: u64, per_page: u32) -> u64 {
        if total == 0 {
            return 0;
        }
        total.div_ceil(u64::from(per_page.max(1)))
    }

    pub fn is_consistent(&self) -> bool {
        self.per_page >= 1
            && self.total_pages == Self::expected_total_pages(self.total, self.per_page)
            && self.items.len() <= self.per_page as usize
    }

    /// Repair a collaborator page so the pagination invariants hold.
    pub fn normalized(mut self) -> Self {
        if self.is_consistent() {
            return self;
        }
        warn!(
            page = self.page,
            per_page = self.per_page,
            total = self.total,
            total_pages = self.total_pages,
            items = self.items.len(),
            "Browse page violates pagination invariants; normalizing"
        );
        self.per_page = self.per_page.max(1);
        self.page = self.page.max(1);
        self.total_pages = Self::expected_total_pages(self.total, self.per_page);
        self.items.truncate(self.per_page as usize);
        self
    }
}
