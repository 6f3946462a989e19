//! Browse endpoint client.

use async_trait::async_trait;
use tracing::{debug, instrument};

use vitrina_core::query::QueryParams;
use vitrina_core::{BrowseBackend, BrowsePage, Error, Result};

use crate::http::ApiClient;

pub const BROWSE_PATH: &str = "/api/v1/products/browse";

/// HTTP browse backend.
#[derive(Debug, Clone)]
pub struct BrowseClient {
    api: ApiClient,
}

impl BrowseClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl BrowseBackend for BrowseClient {
    #[instrument(skip(self, params), fields(subsystem = "client", component = "browse", op = "browse", param_count = params.len()))]
    async fn browse(&self, params: &QueryParams) -> Result<BrowsePage> {
        let page: BrowsePage = self
            .api
            .get_json(BROWSE_PATH, params)
            .await
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;

        let page = page.normalized();
        debug!(
            result_count = page.items.len(),
            total = page.total,
            page = page.page,
            "Browse complete"
        );
        Ok(page)
    }
}
