//! City directory client.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument, warn};

use vitrina_core::query::QueryParams;
use vitrina_core::{City, CitySource, Error, Result};

use crate::http::ApiClient;

pub const CITIES_PATH: &str = "/api/v1/cities";

/// HTTP city directory source.
#[derive(Debug, Clone)]
pub struct CityClient {
    api: ApiClient,
}

impl CityClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CitySource for CityClient {
    #[instrument(skip(self), fields(subsystem = "client", component = "cities", op = "cities"))]
    async fn cities(&self) -> Result<Vec<City>> {
        let payload: JsonValue = self
            .api
            .get_json(CITIES_PATH, &QueryParams::new())
            .await
            .map_err(|e| Error::Unavailable(format!("cities: {}", e)))?;

        let JsonValue::Array(records) = payload else {
            warn!("Cities payload is not an array; treating as empty");
            return Ok(Vec::new());
        };

        let total = records.len();
        let cities: Vec<City> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(city) => Some(city),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed city record");
                    None
                }
            })
            .collect();
        debug!(result_count = cities.len(), skipped = total - cities.len(), "Fetched cities");
        Ok(cities)
    }
}
