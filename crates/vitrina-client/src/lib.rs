//! # vitrina-client
//!
//! HTTP collaborators for the vitrina catalog API and the page service that
//! orchestrates them.
//!
//! Each client implements one of the `vitrina_core` collaborator traits and
//! maps transport failures into the core error taxonomy, so the page service
//! can degrade per collaborator.
//!
//! # Example
//!
//! ```no_run
//! use vitrina_client::{CatalogService, ClientConfig};
//! use vitrina_core::QueryParams;
//!
//! # async fn run() -> vitrina_core::Result<()> {
//! let service = CatalogService::from_config(ClientConfig::new("http://localhost:8081", "acme"))?;
//! let params: QueryParams = [("type", "service"), ("city", "beograd")].into_iter().collect();
//! let view = service.load(&params).await;
//! println!("{} results", view.page.total);
//! # Ok(())
//! # }
//! ```

pub mod browse;
pub mod catalog;
pub mod categories;
pub mod cities;
pub mod config;
pub mod facets;
pub mod http;
pub mod price_history;

pub use browse::BrowseClient;
pub use catalog::{CatalogService, CatalogView, ItemView, PageSummary};
pub use categories::CategoryClient;
pub use cities::CityClient;
pub use config::{ClientConfig, ConfigError};
pub use facets::FacetSchemaClient;
pub use http::{ApiClient, HttpError};
pub use price_history::PriceHistoryClient;
