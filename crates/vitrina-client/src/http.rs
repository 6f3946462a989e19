//! Shared HTTP plumbing for the catalog API collaborators.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use vitrina_core::query::QueryParams;

use crate::config::ClientConfig;

/// Query parameter carrying the tenant on every request.
pub const TENANT_PARAM: &str = "tenant_id";

/// Requests slower than this are logged at warn.
const SLOW_REQUEST_MS: u64 = 2000;

/// Failures at the HTTP seam, before mapping into the core taxonomy.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to create HTTP client: {0}")]
    Build(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Thin wrapper over a shared `reqwest::Client` bound to one API base and
/// tenant.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        debug!(
            api_base = %config.api_base,
            tenant_id = %config.tenant_id,
            timeout_secs = config.http_timeout_secs,
            "Initializing catalog API client"
        );

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tenant_id(&self) -> &str {
        &self.config.tenant_id
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `tenant_id` is appended from the configuration unless `params` already
    /// carries one.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, HttpError> {
        let mut params = params.clone();
        if !params.contains_key(TENANT_PARAM) {
            params.append(TENANT_PARAM, self.config.tenant_id.as_str());
        }

        let start = Instant::now();
        let response = self
            .client
            .get(self.url(path))
            .query(params.as_pairs())
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;

        log_timing(path, start.elapsed());
        Ok(body)
    }
}

fn log_timing(path: &str, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;
    debug!(path, duration_ms, "Catalog API request complete");
    if duration_ms > SLOW_REQUEST_MS {
        warn!(path, duration_ms, slow = true, "Slow catalog API request");
    }
}
