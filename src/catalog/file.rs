//! JSON file catalog.

use super::error::{CatalogError, CatalogResult};
use super::{BackendRecord, RouteCatalog, RouteRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The on-disk document shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    backends: Vec<BackendRecord>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
}

/// A route catalog stored as one JSON document on disk:
/// `{"backends": [...], "routes": [...]}`.
///
/// The file is re-read on every reload, so edits become visible the
/// next time `/reload` is hit.
#[derive(Debug)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    /// Create a catalog backed by the document at `path`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> CatalogResult<CatalogDocument> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| CatalogError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl RouteCatalog for FileCatalog {
    fn load_backends(&self) -> CatalogResult<Vec<BackendRecord>> {
        Ok(self.read()?.backends)
    }

    fn load_routes(&self) -> CatalogResult<Vec<RouteRecord>> {
        Ok(self.read()?.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reads_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{
                "backends": [
                    {"backend_id": "frontend", "backend_url": "http://frontend.internal"}
                ],
                "routes": [
                    {"incoming_path": "/", "route_type": "prefix", "handler": "backend", "backend_id": "frontend"}
                ]
            }"#,
        )
        .unwrap();

        let catalog = FileCatalog::new(&path);
        let backends = catalog.load_backends().unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].backend_id, "frontend");

        let routes = catalog.load_routes().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route_type, "prefix");
        assert_eq!(routes[0].backend_id.as_deref(), Some("frontend"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "{}").unwrap();

        let catalog = FileCatalog::new(&path);
        assert!(catalog.load_backends().unwrap().is_empty());
        assert!(catalog.load_routes().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let catalog = FileCatalog::new("/nonexistent/routes.json");
        assert!(matches!(
            catalog.load_routes(),
            Err(CatalogError::Read { .. })
        ));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "{not json").unwrap();

        let catalog = FileCatalog::new(&path);
        assert!(matches!(
            catalog.load_routes(),
            Err(CatalogError::Parse(_))
        ));
    }
}
