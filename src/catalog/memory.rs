//! In-memory catalog.

use super::error::{CatalogError, CatalogResult};
use super::{BackendRecord, RouteCatalog, RouteRecord};
use std::sync::atomic::{AtomicBool, Ordering};

/// A catalog serving fixed records from memory.
///
/// Used by tests and by embedders that manage routes themselves. The
/// failure switch makes `load_routes` return an error, simulating the
/// catalog becoming unreachable between loading backends and loading
/// routes.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    backends: Vec<BackendRecord>,
    routes: Vec<RouteRecord>,
    fail_routes: AtomicBool,
}

impl MemoryCatalog {
    /// Create a catalog with the given records.
    #[must_use]
    pub fn new(backends: Vec<BackendRecord>, routes: Vec<RouteRecord>) -> Self {
        Self {
            backends,
            routes,
            fail_routes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `load_routes` calls fail (or succeed again).
    pub fn set_fail_routes(&self, fail: bool) {
        self.fail_routes.store(fail, Ordering::SeqCst);
    }
}

impl RouteCatalog for MemoryCatalog {
    fn load_backends(&self) -> CatalogResult<Vec<BackendRecord>> {
        Ok(self.backends.clone())
    }

    fn load_routes(&self) -> CatalogResult<Vec<RouteRecord>> {
        if self.fail_routes.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable(
                "connection lost while iterating routes".to_owned(),
            ));
        }
        Ok(self.routes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_records() {
        let catalog = MemoryCatalog::new(
            vec![BackendRecord {
                backend_id: "app".to_owned(),
                backend_url: "http://app.internal".to_owned(),
            }],
            vec![RouteRecord {
                incoming_path: "/app".to_owned(),
                route_type: String::new(),
                handler: "backend".to_owned(),
                backend_id: Some("app".to_owned()),
                redirect_to: None,
                redirect_type: None,
            }],
        );

        assert_eq!(catalog.load_backends().unwrap().len(), 1);
        assert_eq!(catalog.load_routes().unwrap().len(), 1);
    }

    #[test]
    fn test_failure_switch() {
        let catalog = MemoryCatalog::new(Vec::new(), Vec::new());
        catalog.set_fail_routes(true);
        assert!(matches!(
            catalog.load_routes(),
            Err(CatalogError::Unavailable(_))
        ));

        catalog.set_fail_routes(false);
        assert!(catalog.load_routes().is_ok());
    }
}
