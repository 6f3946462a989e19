//! Error types for the vitrina catalog engine.

use thiserror::Error;

/// Result type alias using vitrina's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalog operations.
///
/// None of these are fatal to the process. Callers degrade the page instead:
/// schema and category failures hide filter controls, catalog failures show an
/// empty result set with an error banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Requested domain is not one of `goods` / `services`
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Facet schema could not be fetched or decoded
    #[error("Facet schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// Category tree is cyclic, too deep, or otherwise invalid
    #[error("Malformed category tree: {0}")]
    MalformedTree(String),

    /// Browse endpoint failed
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Supporting collaborator (cities, price history) failed
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure came from a collaborator and should degrade, not abort.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Error::SchemaUnavailable(_)
                | Error::MalformedTree(_)
                | Error::CatalogUnavailable(_)
                | Error::Unavailable(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
