//! Price history client. The chart payload is passed through untouched.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::instrument;

use vitrina_core::query::{param, QueryParams};
use vitrina_core::{Error, PriceHistorySource, PricePeriod, Result};

use crate::http::ApiClient;

/// HTTP price history source.
#[derive(Debug, Clone)]
pub struct PriceHistoryClient {
    api: ApiClient,
}

impl PriceHistoryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn price_history_path(product_id: &str) -> Result<String> {
    let id = product_id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidInput(format!("invalid product id: {:?}", product_id)));
    }
    Ok(format!("/api/v1/products/{}/price-history", id))
}

#[async_trait]
impl PriceHistorySource for PriceHistoryClient {
    #[instrument(skip(self), fields(subsystem = "client", component = "price_history", op = "price_history"))]
    async fn price_history(
        &self,
        product_id: &str,
        period: PricePeriod,
        locale: Option<&str>,
    ) -> Result<JsonValue> {
        let path = price_history_path(product_id)?;

        let mut params = QueryParams::new();
        params.append("period", period.as_str());
        if let Some(lang) = locale.or(self.api.config().locale.as_deref()) {
            params.append(param::LANG, lang);
        }

        self.api
            .get_json(&path, &params)
            .await
            .map_err(|e| Error::Unavailable(format!("price history: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_history_path() {
        assert_eq!(
            price_history_path("p-42").unwrap(),
            "/api/v1/products/p-42/price-history"
        );
        assert!(price_history_path("").is_err());
        assert!(price_history_path("../admin").is_err());
    }
}
