//! Schema packs: the deployed facet schemas, one per domain.
//!
//! A pack file maps each domain to its schema body:
//!
//! ```json
//! { "goods": { "facets": [{ "semantic_type": "price", "facet_type": "range" }] },
//!   "services": { "facets": [] } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use vitrina_core::{Domain, FacetSchema, FacetSchemaSource};

use crate::error::{ContractError, ContractResult};

/// Declared semantic types per domain, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPack {
    domains: BTreeMap<String, Vec<String>>,
}

impl SchemaPack {
    /// Parse a pack document.
    pub fn from_json_str(text: &str) -> ContractResult<Self> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|e| ContractError::InvalidPack(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_file(path: &Path) -> ContractResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pack = Self::from_json_str(&text)?;
        debug!(path = %path.display(), domain_count = pack.domains.len(), "Loaded schema pack");
        Ok(pack)
    }

    fn from_value(value: &JsonValue) -> ContractResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ContractError::InvalidPack("top level must be an object".to_string()))?;
        if object.is_empty() {
            return Err(ContractError::EmptyPack);
        }

        let mut domains = BTreeMap::new();
        for (domain, schema) in object {
            let facets = schema
                .get("facets")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| {
                    ContractError::InvalidPack(format!("domain '{}' has no facets array", domain))
                })?;

            let mut types = Vec::with_capacity(facets.len());
            for (idx, facet) in facets.iter().enumerate() {
                let semantic_type = facet
                    .get("semantic_type")
                    .and_then(JsonValue::as_str)
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        ContractError::InvalidPack(format!(
                            "domain '{}' facet #{} has no semantic_type",
                            domain, idx
                        ))
                    })?;
                types.push(semantic_type);
            }
            domains.insert(domain.clone(), types);
        }
        Ok(Self { domains })
    }

    /// Build a pack from already-fetched schemas.
    pub fn from_schemas<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = FacetSchema>,
    {
        let domains = schemas
            .into_iter()
            .map(|schema| {
                let types = schema.semantic_types().map(str::to_string).collect();
                (schema.domain.as_str().to_string(), types)
            })
            .collect();
        Self { domains }
    }

    /// Fetch the live schema of every domain for a tenant.
    pub async fn fetch(source: &dyn FacetSchemaSource, tenant_id: &str) -> ContractResult<Self> {
        let mut schemas = Vec::with_capacity(Domain::ALL.len());
        for domain in Domain::ALL {
            let schema = source
                .facet_schema(domain, tenant_id)
                .await
                .map_err(|e| ContractError::Fetch(format!("{}: {}", domain, e)))?;
            schemas.push(schema);
        }
        info!(tenant_id, domain_count = schemas.len(), "Fetched live facet schemas");
        Ok(Self::from_schemas(schemas))
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Union of declared semantic types, in first-appearance order with
    /// domains visited in sorted order.
    pub fn semantic_types(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for types in self.domains.values() {
            for semantic_type in types {
                if !out.contains(semantic_type) {
                    out.push(semantic_type.clone());
                }
            }
        }
        out
    }
}
