//! The route catalog interface.
//!
//! The core does not own persistent storage of routes; it only
//! defines the records it consumes and the [`RouteCatalog`] trait the
//! loader reads them through. [`FileCatalog`] reads a JSON document
//! from disk; [`MemoryCatalog`] serves fixed records for tests and
//! embedding.

mod error;
mod file;
mod memory;

pub use error::{CatalogError, CatalogResult};
pub use file::FileCatalog;
pub use memory::MemoryCatalog;

use serde::{Deserialize, Serialize};

/// A named upstream service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRecord {
    /// Unique backend name referenced by routes.
    pub backend_id: String,
    /// Absolute URL of the upstream.
    pub backend_url: String,
}

/// One route declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    /// The path the route is registered under.
    pub incoming_path: String,
    /// `prefix`, `suffix`, or anything else for exact.
    #[serde(default)]
    pub route_type: String,
    /// `backend`, `redirect`, `gone`, or `boom`.
    pub handler: String,
    /// Backend name, required when `handler` is `backend`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    /// Redirect target, required when `handler` is `redirect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// `temporary` for 302; anything else is permanent (301).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_type: Option<String>,
}

/// Source of backend and route records for a reload.
pub trait RouteCatalog: Send + Sync {
    /// Fetch all backend records.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn load_backends(&self) -> CatalogResult<Vec<BackendRecord>>;

    /// Fetch all route records.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn load_routes(&self) -> CatalogResult<Vec<RouteRecord>>;
}
