//! Facet schema client with a short-TTL in-process cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use vitrina_core::query::QueryParams;
use vitrina_core::{Domain, Error, FacetDefinition, FacetSchema, FacetSchemaSource, ProductType, Result};

use crate::http::{ApiClient, TENANT_PARAM};

pub const FACETS_PATH: &str = "/api/v1/products/facets";

/// Wire shape of the facet schema endpoint. Fields are optional so a partial
/// payload can be diagnosed instead of failing opaquely in serde.
#[derive(Debug, Deserialize)]
struct SchemaPayload {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    tenant_id: Option<String>,
    #[serde(default)]
    facets: Option<Vec<FacetDefinition>>,
}

type CacheKey = (Domain, String);

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    schema: FacetSchema,
}

/// HTTP facet schema source.
///
/// Cheap to clone; clones share the cache.
#[derive(Debug, Clone)]
pub struct FacetSchemaClient {
    api: ApiClient,
    ttl: Option<Duration>,
    cache: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl FacetSchemaClient {
    pub fn new(api: ApiClient) -> Self {
        let ttl = api.config().schema_ttl();
        Self {
            api,
            ttl,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch by domain name, failing fast with `InvalidDomain` for anything
    /// other than `goods` or `services`.
    pub async fn facet_schema_by_name(&self, domain: &str, tenant_id: &str) -> Result<FacetSchema> {
        let domain: Domain = domain.parse()?;
        self.facet_schema(domain, tenant_id).await
    }

    /// Drop every cached schema.
    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    /// Fresh cached schema for `key`. An expired entry is evicted.
    async fn cached(&self, key: &CacheKey) -> Option<FacetSchema> {
        let ttl = self.ttl?;
        {
            let cache = self.cache.read().await;
            match cache.get(key) {
                None => return None,
                Some(entry) if entry.fetched_at.elapsed() < ttl => return Some(entry.schema.clone()),
                Some(_) => {}
            }
        }

        let mut cache = self.cache.write().await;
        if cache.get(key).is_some_and(|entry| entry.fetched_at.elapsed() >= ttl) {
            cache.remove(key);
            debug!(domain = %key.0, "Evicted expired facet schema");
        }
        None
    }

    async fn store(&self, key: CacheKey, schema: &FacetSchema) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let mut cache = self.cache.write().await;
        cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        cache.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                schema: schema.clone(),
            },
        );
    }

    async fn fetch(&self, domain: Domain, tenant_id: &str) -> Result<FacetSchema> {
        let mut params = QueryParams::new();
        params.append("type", domain.as_str());
        params.append(TENANT_PARAM, tenant_id);

        let payload: SchemaPayload = self
            .api
            .get_json(FACETS_PATH, &params)
            .await
            .map_err(|e| Error::SchemaUnavailable(e.to_string()))?;

        if let Some(returned) = payload.domain.as_deref() {
            if returned != domain.as_str() {
                return Err(Error::SchemaUnavailable(format!(
                    "requested {} schema, received {}",
                    domain, returned
                )));
            }
        }

        let facets = payload.facets.ok_or_else(|| {
            Error::SchemaUnavailable(format!("{} schema has no facets array", domain))
        })?;

        Ok(FacetSchema {
            domain,
            tenant_id: payload
                .tenant_id
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| tenant_id.to_string()),
            facets,
        }
        .normalized())
    }
}

#[async_trait]
impl FacetSchemaSource for FacetSchemaClient {
    #[instrument(skip(self), fields(subsystem = "client", component = "facets", op = "facet_schema", domain = %domain))]
    async fn facet_schema(&self, domain: Domain, tenant_id: &str) -> Result<FacetSchema> {
        let key = (domain, tenant_id.to_string());
        if let Some(schema) = self.cached(&key).await {
            debug!(facet_count = schema.facets.len(), "Facet schema cache hit");
            return Ok(schema);
        }

        match self.fetch(domain, tenant_id).await {
            Ok(schema) => {
                debug!(facet_count = schema.facets.len(), "Fetched facet schema");
                self.store(key, &schema).await;
                Ok(schema)
            }
            Err(e) => {
                warn!(error = %e, "Facet schema fetch failed");
                Err(e)
            }
        }
    }

    /// Warm the cache for the domain a product type selects.
    ///
    /// Fire-and-forget: does nothing outside a Tokio runtime or when caching
    /// is disabled, and failures are only logged.
    fn prefetch(&self, product_type: ProductType, tenant_id: &str) {
        if self.ttl.is_none() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available; skipping facet schema prefetch");
            return;
        };

        let client = self.clone();
        let tenant_id = tenant_id.to_string();
        let domain = Domain::for_product_type(product_type);
        handle.spawn(async move {
            if let Err(e) = client.facet_schema(domain, &tenant_id).await {
                debug!(domain = %domain, error = %e, "Facet schema prefetch failed");
            }
        });
    }
}
