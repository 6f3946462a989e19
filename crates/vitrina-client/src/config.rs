//! Client configuration.
//!
//! Configuration is an explicit value handed to every collaborator; nothing in
//! the client reads global state after construction.
//!
//! # Environment Variables
//!
//! - `VITRINA_API_BASE`: catalog API base URL (default `http://localhost:8081`)
//! - `VITRINA_TENANT_ID`: tenant identifier (default `default`)
//! - `VITRINA_LOCALE`: display locale for names and prices (optional)
//! - `VITRINA_HTTP_TIMEOUT_SECS`: per-request timeout (default 10)
//! - `VITRINA_SCHEMA_TTL_SECS`: facet schema cache TTL, `0` disables (default 60)

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vitrina_core::defaults;

pub const ENV_API_BASE: &str = "VITRINA_API_BASE";
pub const ENV_TENANT_ID: &str = "VITRINA_TENANT_ID";
pub const ENV_LOCALE: &str = "VITRINA_LOCALE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "VITRINA_HTTP_TIMEOUT_SECS";
pub const ENV_SCHEMA_TTL_SECS: &str = "VITRINA_SCHEMA_TTL_SECS";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Catalog API client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, without trailing slash.
    pub api_base: String,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub http_timeout_secs: u64,
    pub schema_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::API_BASE.to_string(),
            tenant_id: defaults::TENANT_ID.to_string(),
            locale: None,
            http_timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            schema_ttl_secs: defaults::SCHEMA_TTL_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            tenant_id: tenant_id.into(),
            ..Self::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    pub fn with_schema_ttl_secs(mut self, secs: u64) -> Self {
        self.schema_ttl_secs = secs;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let parse_secs = |var: &'static str, default: u64| -> ConfigResult<u64> {
            match non_blank(var) {
                None => Ok(default),
                Some(value) => value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue { var, value }),
            }
        };

        let config = Self {
            api_base: non_blank(ENV_API_BASE)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| defaults::API_BASE.to_string()),
            tenant_id: non_blank(ENV_TENANT_ID).unwrap_or_else(|| defaults::TENANT_ID.to_string()),
            locale: non_blank(ENV_LOCALE),
            http_timeout_secs: parse_secs(ENV_HTTP_TIMEOUT_SECS, defaults::HTTP_TIMEOUT_SECS)?,
            schema_ttl_secs: parse_secs(ENV_SCHEMA_TTL_SECS, defaults::SCHEMA_TTL_SECS)?,
        };

        debug!(
            api_base = %config.api_base,
            tenant_id = %config.tenant_id,
            locale = ?config.locale,
            timeout_secs = config.http_timeout_secs,
            schema_ttl_secs = config.schema_ttl_secs,
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_base.is_empty() {
            return Err(ConfigError::Validation(
                "api_base cannot be empty".to_string(),
            ));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api_base must start with http:// or https://, got: {}",
                self.api_base
            )));
        }

        if self.tenant_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tenant_id cannot be empty".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Schema cache TTL; `None` when caching is disabled.
    pub fn schema_ttl(&self) -> Option<Duration> {
        (self.schema_ttl_secs > 0).then(|| Duration::from_secs(self.schema_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "http://localhost:8081");
        assert_eq!(config.tenant_id, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_BASE, "https://api.example.rs/"),
            (ENV_TENANT_ID, "acme"),
            (ENV_LOCALE, "sr"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
            (ENV_SCHEMA_TTL_SECS, "0"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "https://api.example.rs");
        assert_eq!(config.tenant_id, "acme");
        assert_eq!(config.locale.as_deref(), Some("sr"));
        assert_eq!(config.http_timeout(), Duration::from_secs(3));
        assert_eq!(config.schema_ttl(), None);
    }

    #[test]
    fn test_from_lookup_blank_values_use_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_TENANT_ID, "  "), (ENV_LOCALE, "")])).unwrap();
        assert_eq!(config.tenant_id, "default");
        assert_eq!(config.locale, None);
    }

    #[test]
    fn test_from_lookup_rejects_non_numeric_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "ten")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: ENV_HTTP_TIMEOUT_SECS,
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::new("ftp://catalog", "acme");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::default().with_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_schema_ttl_enabled_by_default() {
        assert_eq!(ClientConfig::default().schema_ttl(), Some(Duration::from_secs(60)));
    }
}
