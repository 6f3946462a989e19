//! Catalog page service.
//!
//! Assembles everything a catalog page renders from one set of request
//! parameters. The schema fetch gates the browse request, so the two are
//! chained; the category and city fetches run alongside them. Every branch
//! settles independently: a failing collaborator degrades its own part of the
//! page and leaves a warning, never aborting the others.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use vitrina_core::gate::{gate_query, visible_controls};
use vitrina_core::pagination::{window, PageWindow};
use vitrina_core::presenter::{price_display_with, PlainFormatter, PriceFormatter};
use vitrina_core::query::{self, param, QueryParams};
use vitrina_core::{
    city_options, defaults, flatten, BrowseBackend, BrowsePage, BrowseQuery, CatalogItem,
    CategoryOption, CategorySource, CitySource, CityOption, FacetSchemaSource, FacetSet,
    ProductType, Result, VisibleControl,
};

use crate::browse::BrowseClient;
use crate::categories::CategoryClient;
use crate::cities::CityClient;
use crate::config::ClientConfig;
use crate::facets::FacetSchemaClient;
use crate::http::ApiClient;

// =============================================================================
// VIEW MODEL
// =============================================================================

/// A listing with its rendered price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_display: Option<String>,
}

/// Result counts for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<&BrowsePage> for PageSummary {
    fn from(page: &BrowsePage) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// Everything the rendering layer needs for one catalog page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogView {
    /// The query as sent to the browse endpoint, hidden-facet values removed.
    pub query: BrowseQuery,
    pub facets: FacetSet,
    pub controls: Vec<VisibleControl>,
    pub categories: Vec<CategoryOption>,
    pub cities: Vec<CityOption>,
    pub items: Vec<ItemView>,
    pub page: PageSummary,
    pub pagination: PageWindow,
    pub reset_visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogView {
    /// Query string for a link to `page` with the current filters.
    pub fn page_link(&self, page: u32) -> String {
        query::link_params(&self.query, page).to_string()
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Catalog page orchestrator over the four collaborators.
#[derive(Clone)]
pub struct CatalogService {
    schemas: Arc<dyn FacetSchemaSource>,
    categories: Arc<dyn CategorySource>,
    cities: Arc<dyn CitySource>,
    browse: Arc<dyn BrowseBackend>,
    formatter: Arc<dyn PriceFormatter>,
    tenant_id: String,
    locale: Option<String>,
}

impl CatalogService {
    pub fn new(
        schemas: Arc<dyn FacetSchemaSource>,
        categories: Arc<dyn CategorySource>,
        cities: Arc<dyn CitySource>,
        browse: Arc<dyn BrowseBackend>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            schemas,
            categories,
            cities,
            browse,
            formatter: Arc::new(PlainFormatter),
            tenant_id: tenant_id.into(),
            locale: None,
        }
    }

    /// Wire the HTTP collaborators from a configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| vitrina_core::Error::Config(e.to_string()))?;
        let tenant_id = config.tenant_id.clone();
        let locale = config.locale.clone();
        let api = ApiClient::new(config).map_err(|e| vitrina_core::Error::Config(e.to_string()))?;

        let mut service = Self::new(
            Arc::new(FacetSchemaClient::new(api.clone())),
            Arc::new(CategoryClient::new(api.clone())),
            Arc::new(CityClient::new(api.clone())),
            Arc::new(BrowseClient::new(api)),
            tenant_id,
        );
        service.locale = locale;
        Ok(service)
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn PriceFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Warm the schema cache when the product type control changes.
    pub fn prefetch_schema(&self, product_type: ProductType) {
        self.schemas.prefetch(product_type, &self.tenant_id);
    }

    /// Build the page for a set of raw request parameters.
    #[instrument(skip(self, raw), fields(subsystem = "client", component = "catalog", op = "load", tenant_id = %self.tenant_id))]
    pub async fn load(&self, raw: &QueryParams) -> CatalogView {
        let start = Instant::now();
        let decoded = query::decode(raw);
        let locale = self.locale.as_deref();

        let (gated, categories, cities) = tokio::join!(
            self.gated_browse(&decoded),
            self.load_categories(locale),
            self.load_cities(),
        );

        let GatedBrowse {
            facets,
            query,
            page,
            mut warnings,
            error,
        } = gated;
        let (categories, category_warning) = categories;
        let (cities, city_warning) = cities;
        warnings.extend(category_warning);
        warnings.extend(city_warning);

        let controls = visible_controls(&facets, query.product_type);
        let summary = PageSummary::from(&page);
        let total_pages = u32::try_from(page.total_pages).unwrap_or(u32::MAX);
        let pagination = window(page.page, total_pages, defaults::PAGE_WINDOW);
        let items = page
            .items
            .into_iter()
            .map(|item| ItemView {
                price_display: price_display_with(self.formatter.as_ref(), &item, locale),
                item,
            })
            .collect::<Vec<_>>();

        info!(
            domain = %query.domain(),
            result_count = items.len(),
            total = summary.total,
            warning_count = warnings.len(),
            failed = error.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog page loaded"
        );

        CatalogView {
            reset_visible: query.has_active_filters(),
            query,
            facets,
            controls,
            categories,
            cities,
            items,
            page: summary,
            pagination,
            warnings,
            error,
        }
    }

    /// Schema fetch, gate, then browse.
    async fn gated_browse(&self, decoded: &BrowseQuery) -> GatedBrowse {
        let domain = decoded.domain();
        let mut warnings = Vec::new();

        let facets = match self.schemas.facet_schema(domain, &self.tenant_id).await {
            Ok(schema) => FacetSet::from_schema(&schema),
            Err(e) => {
                warn!(domain = %domain, error = %e, "Facet schema unavailable; hiding all facet controls");
                warnings.push(e.to_string());
                FacetSet::empty()
            }
        };

        let query = gate_query(decoded, &facets);
        let mut params = query::encode(&query);
        if let Some(lang) = self.locale.as_deref() {
            params.append(param::LANG, lang);
        }

        let (page, error) = match self.browse.browse(&params).await {
            Ok(page) => (page, None),
            Err(e) => {
                error!(domain = %domain, error = %e, "Browse failed; rendering empty result set");
                (BrowsePage::empty(query.page, query.per_page), Some(e.to_string()))
            }
        };

        GatedBrowse {
            facets,
            query,
            page,
            warnings,
            error,
        }
    }

    async fn load_categories(&self, locale: Option<&str>) -> (Vec<CategoryOption>, Option<String>) {
        let result = match self.categories.category_tree(locale).await {
            Ok(tree) => flatten(&tree),
            Err(e) => Err(e),
        };
        match result {
            Ok(options) => (options, None),
            Err(e) => {
                warn!(error = %e, "Category tree unavailable; rendering without categories");
                (Vec::new(), Some(e.to_string()))
            }
        }
    }

    async fn load_cities(&self) -> (Vec<CityOption>, Option<String>) {
        match self.cities.cities().await {
            Ok(cities) => (city_options(&cities), None),
            Err(e) => {
                warn!(error = %e, "City list unavailable; rendering without cities");
                (Vec::new(), Some(e.to_string()))
            }
        }
    }
}

struct GatedBrowse {
    facets: FacetSet,
    query: BrowseQuery,
    page: BrowsePage,
    warnings: Vec<String>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use vitrina_core::{
        CategoryNode, City, Domain, Error, FacetDefinition, FacetSchema, FacetType,
    };

    struct FakeSchemas(Option<FacetSchema>);

    #[async_trait]
    impl FacetSchemaSource for FakeSchemas {
        async fn facet_schema(&self, domain: Domain, _tenant_id: &str) -> Result<FacetSchema> {
            match &self.0 {
                Some(schema) if schema.domain == domain => Ok(schema.clone()),
                _ => Err(Error::SchemaUnavailable("status 503".to_string())),
            }
        }
    }

    struct FakeCategories(Result<Vec<CategoryNode>>);

    #[async_trait]
    impl CategorySource for FakeCategories {
        async fn category_tree(&self, _locale: Option<&str>) -> Result<Vec<CategoryNode>> {
            self.0.clone()
        }
    }

    struct FakeCities(Result<Vec<City>>);

    #[async_trait]
    impl CitySource for FakeCities {
        async fn cities(&self) -> Result<Vec<City>> {
            self.0.clone()
        }
    }

    /// Records the parameters of every browse call.
    struct RecordingBrowse {
        result: Result<BrowsePage>,
        calls: Mutex<Vec<QueryParams>>,
    }

    impl RecordingBrowse {
        fn new(result: Result<BrowsePage>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn last_params(&self) -> QueryParams {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl BrowseBackend for RecordingBrowse {
        async fn browse(&self, params: &QueryParams) -> Result<BrowsePage> {
            self.calls.lock().unwrap().push(params.clone());
            self.result.clone()
        }
    }

    fn services_schema() -> FacetSchema {
        FacetSchema::new(Domain::Services, "acme")
            .with_facet(FacetDefinition::new("category", FacetType::Enum))
            .with_facet(FacetDefinition::new("location", FacetType::Enum))
            .with_facet(FacetDefinition::new("duration", FacetType::Range))
            .with_facet(FacetDefinition::new("price", FacetType::Range))
    }

    fn city(slug: &str, sort_order: i32) -> City {
        City {
            id: slug.to_string(),
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            region: None,
            sort_order,
            is_active: true,
        }
    }

    fn results_page() -> BrowsePage {
        BrowsePage {
            items: vec![
                CatalogItem::service("s1", "Haircut").with_prices(Some(1500.0), Some(1500.0)),
                CatalogItem::service("s2", "Massage").with_prices(Some(3000.0), None),
            ],
            page: 1,
            per_page: 20,
            total: 45,
            total_pages: 3,
        }
    }

    fn service(
        schema: Option<FacetSchema>,
        categories: Result<Vec<CategoryNode>>,
        cities: Result<Vec<City>>,
        browse: Arc<RecordingBrowse>,
    ) -> CatalogService {
        CatalogService::new(
            Arc::new(FakeSchemas(schema)),
            Arc::new(FakeCategories(categories)),
            Arc::new(FakeCities(cities)),
            browse,
            "acme",
        )
    }

    fn raw(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_load_services_page() {
        let browse = RecordingBrowse::new(Ok(results_page()));
        let svc = service(
            Some(services_schema()),
            Ok(vec![CategoryNode::new("1", "beauty", "Beauty")]),
            Ok(vec![city("nis", 2), city("beograd", 1)]),
            browse.clone(),
        );

        let view = svc
            .load(&raw(&[("type", "service"), ("brand", "Acme"), ("min_duration", "30")]))
            .await;

        assert!(view.warnings.is_empty());
        assert_eq!(view.error, None);
        assert_eq!(view.query.brand, None);
        assert_eq!(view.query.min_duration, Some(30));

        let sent = browse.last_params();
        assert!(!sent.contains_key("brand"));
        assert_eq!(sent.get("min_duration"), Some("30"));

        let controls: Vec<&str> = view.controls.iter().map(|c| c.semantic_type.as_str()).collect();
        assert_eq!(controls, vec!["category", "location", "price", "duration"]);

        assert_eq!(view.categories.len(), 1);
        let cities: Vec<&str> = view.cities.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(cities, vec!["beograd", "nis"]);

        assert_eq!(view.items[0].price_display.as_deref(), Some("from 1 500 RSD"));
        assert_eq!(view.page.total_pages, 3);
        assert_eq!(view.pagination.pages, vec![1, 2, 3]);
        assert!(view.reset_visible);
    }

    #[tokio::test]
    async fn test_schema_failure_fails_closed() {
        let browse = RecordingBrowse::new(Ok(BrowsePage::empty(1, 20)));
        let svc = service(None, Ok(vec![]), Ok(vec![]), browse.clone());

        let view = svc
            .load(&raw(&[("category", "alati"), ("min_price", "100"), ("q", "drill")]))
            .await;

        assert!(view.facets.is_empty());
        assert!(view.controls.is_empty());
        assert_eq!(view.warnings.len(), 1);
        assert!(view.warnings[0].contains("Facet schema unavailable"));
        assert_eq!(view.error, None);

        let keys: Vec<String> = browse.last_params().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["query", "page", "per_page"]);
    }

    #[tokio::test]
    async fn test_browse_failure_surfaces_error_with_empty_page() {
        let browse = RecordingBrowse::new(Err(Error::CatalogUnavailable("timeout".to_string())));
        let svc = service(Some(services_schema()), Ok(vec![]), Ok(vec![city("nis", 0)]), browse);

        let view = svc.load(&raw(&[("type", "service"), ("page", "4")])).await;

        assert_eq!(view.error.as_deref(), Some("Catalog unavailable: timeout"));
        assert!(view.items.is_empty());
        assert_eq!(view.page.page, 4);
        assert_eq!(view.page.total, 0);
        assert!(view.pagination.is_empty());
        // Other branches still rendered.
        assert_eq!(view.cities.len(), 1);
        assert!(!view.controls.is_empty());
    }

    #[tokio::test]
    async fn test_category_and_city_failures_degrade_independently() {
        let browse = RecordingBrowse::new(Ok(results_page()));
        let svc = service(
            Some(services_schema()),
            Err(Error::Unavailable("category tree: status 500".to_string())),
            Err(Error::Unavailable("cities: status 502".to_string())),
            browse,
        );

        let view = svc.load(&raw(&[("type", "service")])).await;

        assert!(view.categories.is_empty());
        assert!(view.cities.is_empty());
        assert_eq!(view.warnings.len(), 2);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.error, None);
    }

    #[tokio::test]
    async fn test_malformed_tree_degrades_to_empty_categories() {
        let cyclic = CategoryNode::new("1", "a", "A").with_child(CategoryNode::new("1", "a", "A"));
        let browse = RecordingBrowse::new(Ok(results_page()));
        let svc = service(Some(services_schema()), Ok(vec![cyclic]), Ok(vec![]), browse);

        let view = svc.load(&raw(&[("type", "service")])).await;
        assert!(view.categories.is_empty());
        assert!(view.warnings[0].contains("Malformed category tree"));
    }

    #[tokio::test]
    async fn test_locale_forwarded_to_browse_and_presenter() {
        let browse = RecordingBrowse::new(Ok(results_page()));
        let svc = service(Some(services_schema()), Ok(vec![]), Ok(vec![]), browse.clone())
            .with_locale("sr");

        let view = svc.load(&raw(&[("type", "service")])).await;

        assert_eq!(browse.last_params().get("lang"), Some("sr"));
        assert_eq!(view.items[0].price_display.as_deref(), Some("од 1 500 RSD"));
    }

    #[tokio::test]
    async fn test_default_query_has_no_reset() {
        let browse = RecordingBrowse::new(Ok(BrowsePage::empty(1, 20)));
        let svc = service(None, Ok(vec![]), Ok(vec![]), browse);

        let view = svc.load(&QueryParams::new()).await;
        assert!(!view.reset_visible);
        assert_eq!(view.page_link(2), "page=2&per_page=20");
    }

    #[tokio::test]
    async fn test_view_serializes_flat_items() {
        let browse = RecordingBrowse::new(Ok(results_page()));
        let svc = service(Some(services_schema()), Ok(vec![]), Ok(vec![]), browse);

        let view = svc.load(&raw(&[("type", "service")])).await;
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["items"][0]["id"], "s1");
        assert_eq!(json["items"][0]["type"], "service");
        assert_eq!(json["items"][0]["price_display"], "from 1 500 RSD");
        assert!(json.get("error").is_none());
    }
}
