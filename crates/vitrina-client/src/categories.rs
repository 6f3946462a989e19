//! Category tree client.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use vitrina_core::query::{param, QueryParams};
use vitrina_core::{normalize_tree_payload, CategoryNode, CategorySource, Error, Result};

use crate::http::ApiClient;

pub const CATEGORY_TREE_PATH: &str = "/api/v1/categories/tree";

/// HTTP category tree source.
#[derive(Debug, Clone)]
pub struct CategoryClient {
    api: ApiClient,
}

impl CategoryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CategorySource for CategoryClient {
    #[instrument(skip(self), fields(subsystem = "client", component = "categories", op = "category_tree"))]
    async fn category_tree(&self, locale: Option<&str>) -> Result<Vec<CategoryNode>> {
        let mut params = QueryParams::new();
        if let Some(lang) = locale.or(self.api.config().locale.as_deref()) {
            params.append(param::LANG, lang);
        }

        let payload: JsonValue = self
            .api
            .get_json(CATEGORY_TREE_PATH, &params)
            .await
            .map_err(|e| Error::Unavailable(format!("category tree: {}", e)))?;

        let roots = normalize_tree_payload(payload)?;
        debug!(root_count = roots.len(), "Fetched category tree");
        Ok(roots)
    }
}
