//! Building a mux from catalog records.

use crate::catalog::{CatalogResult, RouteCatalog};
use crate::handlers::{BackendHandler, BoomHandler, GoneHandler, Handler, RedirectHandler};
use crate::logging::ErrorLogger;
use crate::mux::{Mux, RouteKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves catalog records into handlers and registers them in a
/// fresh mux.
///
/// Backends load first, then routes, in `(incoming_path, route_type)`
/// ascending order. The fingerprint depends on the insertion
/// sequence, so the sort is part of the contract. Malformed records
/// are logged and skipped; only catalog I/O failures abort the build.
#[derive(Debug)]
pub struct RouteLoader {
    connect_timeout: Duration,
    header_timeout: Duration,
    logger: Arc<ErrorLogger>,
}

impl RouteLoader {
    /// Create a loader with the upstream timeouts applied to every
    /// backend handler it constructs.
    #[must_use]
    pub fn new(
        connect_timeout: Duration,
        header_timeout: Duration,
        logger: Arc<ErrorLogger>,
    ) -> Self {
        Self {
            connect_timeout,
            header_timeout,
            logger,
        }
    }

    /// Build a complete mux from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if either catalog collection cannot be read.
    pub fn build(&self, catalog: &dyn RouteCatalog) -> CatalogResult<Mux> {
        let mut mux = Mux::new();
        let backends = self.load_backends(catalog)?;
        self.load_routes(catalog, &mut mux, &backends)?;
        Ok(mux)
    }

    fn load_backends(
        &self,
        catalog: &dyn RouteCatalog,
    ) -> CatalogResult<HashMap<String, Arc<dyn Handler>>> {
        let mut backends: HashMap<String, Arc<dyn Handler>> = HashMap::new();

        for record in catalog.load_backends()? {
            match BackendHandler::new(
                &record.backend_id,
                &record.backend_url,
                self.connect_timeout,
                self.header_timeout,
                Arc::clone(&self.logger),
            ) {
                Ok(handler) => {
                    backends.insert(record.backend_id, Arc::new(handler));
                },
                Err(e) => {
                    warn!(
                        backend_id = %record.backend_id,
                        backend_url = %record.backend_url,
                        error = %e,
                        "skipping backend with unusable URL"
                    );
                },
            }
        }

        Ok(backends)
    }

    fn load_routes(
        &self,
        catalog: &dyn RouteCatalog,
        mux: &mut Mux,
        backends: &HashMap<String, Arc<dyn Handler>>,
    ) -> CatalogResult<()> {
        let mut routes = catalog.load_routes()?;
        routes.sort_by(|a, b| {
            a.incoming_path
                .cmp(&b.incoming_path)
                .then_with(|| a.route_type.cmp(&b.route_type))
        });

        for route in routes {
            let kind = RouteKind::from_catalog(&route.route_type);

            match route.handler.as_str() {
                "backend" => {
                    let Some(backend_id) = route.backend_id.as_deref() else {
                        warn!(path = %route.incoming_path, "skipping backend route without backend_id");
                        continue;
                    };
                    match backends.get(backend_id) {
                        Some(handler) => {
                            mux.handle(&route.incoming_path, kind, Arc::clone(handler));
                            debug!(
                                path = %route.incoming_path,
                                kind = %kind,
                                backend_id = %backend_id,
                                "registered backend route"
                            );
                        },
                        None => {
                            warn!(
                                path = %route.incoming_path,
                                backend_id = %backend_id,
                                "skipping route referencing unknown backend"
                            );
                        },
                    }
                },
                "redirect" => {
                    let Some(target) = route.redirect_to.as_deref() else {
                        warn!(path = %route.incoming_path, "skipping redirect route without redirect_to");
                        continue;
                    };
                    let temporary = route.redirect_type.as_deref() == Some("temporary");
                    let handler = RedirectHandler::new(
                        &route.incoming_path,
                        target,
                        kind == RouteKind::Prefix,
                        temporary,
                    );
                    mux.handle(&route.incoming_path, kind, Arc::new(handler));
                    debug!(
                        path = %route.incoming_path,
                        kind = %kind,
                        target = %target,
                        "registered redirect route"
                    );
                },
                "gone" => {
                    mux.handle(&route.incoming_path, kind, Arc::new(GoneHandler));
                    debug!(path = %route.incoming_path, kind = %kind, "registered gone route");
                },
                "boom" => {
                    // Diagnostic route for exercising the dispatch
                    // recovery barrier.
                    mux.handle(&route.incoming_path, kind, Arc::new(BoomHandler));
                    debug!(path = %route.incoming_path, kind = %kind, "registered boom route");
                },
                other => {
                    warn!(
                        path = %route.incoming_path,
                        handler = %other,
                        "skipping route with unknown handler kind"
                    );
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BackendRecord, CatalogError, MemoryCatalog, RouteRecord};
    use crate::http::Request;
    use http::StatusCode;
    use tempfile::tempdir;

    fn test_loader() -> (RouteLoader, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let logger = Arc::new(ErrorLogger::open(dir.path().join("error.log")).unwrap());
        (
            RouteLoader::new(Duration::from_secs(1), Duration::from_secs(15), logger),
            dir,
        )
    }

    fn backend(id: &str, url: &str) -> BackendRecord {
        BackendRecord {
            backend_id: id.to_owned(),
            backend_url: url.to_owned(),
        }
    }

    fn route(path: &str, route_type: &str, handler: &str) -> RouteRecord {
        RouteRecord {
            incoming_path: path.to_owned(),
            route_type: route_type.to_owned(),
            handler: handler.to_owned(),
            backend_id: None,
            redirect_to: None,
            redirect_type: None,
        }
    }

    fn backend_route(path: &str, route_type: &str, backend_id: &str) -> RouteRecord {
        RouteRecord {
            backend_id: Some(backend_id.to_owned()),
            ..route(path, route_type, "backend")
        }
    }

    #[test]
    fn test_builds_mux_from_catalog() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(
            vec![backend("app", "http://app.internal")],
            vec![
                backend_route("/app", "prefix", "app"),
                route("/old", "", "gone"),
            ],
        );

        let mux = loader.build(&catalog).unwrap();
        assert_eq!(mux.route_count(), 2);
        assert!(mux.lookup("/app/deep/path").is_some());
        assert!(mux.lookup("/old").is_some());
        assert!(mux.lookup("/other").is_none());
    }

    #[test]
    fn test_skips_unknown_backend() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(
            Vec::new(),
            vec![backend_route("/app", "prefix", "nonexistent")],
        );

        let mux = loader.build(&catalog).unwrap();
        assert_eq!(mux.route_count(), 0);
        assert!(mux.lookup("/app").is_none());
    }

    #[test]
    fn test_skips_malformed_backend_url() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(
            vec![backend("bad", "http://exa mple/"), backend("good", "http://ok.internal")],
            vec![
                backend_route("/bad", "", "bad"),
                backend_route("/good", "", "good"),
            ],
        );

        let mux = loader.build(&catalog).unwrap();
        // The bad backend is dropped, so its route is skipped too.
        assert!(mux.lookup("/bad").is_none());
        assert!(mux.lookup("/good").is_some());
    }

    #[test]
    fn test_skips_unknown_handler_kind() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(Vec::new(), vec![route("/weird", "", "teleport")]);

        let mux = loader.build(&catalog).unwrap();
        assert_eq!(mux.route_count(), 0);
    }

    #[test]
    fn test_skips_redirect_without_target() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(Vec::new(), vec![route("/moved", "", "redirect")]);

        let mux = loader.build(&catalog).unwrap();
        assert_eq!(mux.route_count(), 0);
    }

    #[test]
    fn test_registration_order_is_catalog_sort_order() {
        let (loader, _dir) = test_loader();
        let shuffled = MemoryCatalog::new(
            Vec::new(),
            vec![
                route("/b", "prefix", "gone"),
                route("/a", "", "gone"),
                route("/b", "", "gone"),
            ],
        );
        let sorted = MemoryCatalog::new(
            Vec::new(),
            vec![
                route("/a", "", "gone"),
                route("/b", "", "gone"),
                route("/b", "prefix", "gone"),
            ],
        );

        let from_shuffled = loader.build(&shuffled).unwrap();
        let from_sorted = loader.build(&sorted).unwrap();
        assert_eq!(from_shuffled.route_checksum(), from_sorted.route_checksum());
    }

    #[test]
    fn test_catalog_failure_aborts_build() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(Vec::new(), vec![route("/a", "", "gone")]);
        catalog.set_fail_routes(true);

        assert!(matches!(
            loader.build(&catalog),
            Err(CatalogError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_redirect_route_maps_redirect_type() {
        let (loader, _dir) = test_loader();
        let catalog = MemoryCatalog::new(
            Vec::new(),
            vec![
                RouteRecord {
                    redirect_to: Some("/new".to_owned()),
                    redirect_type: Some("temporary".to_owned()),
                    ..route("/temp", "", "redirect")
                },
                RouteRecord {
                    redirect_to: Some("/new".to_owned()),
                    redirect_type: Some("permanent".to_owned()),
                    ..route("/perm", "", "redirect")
                },
            ],
        );

        let mux = loader.build(&catalog).unwrap();

        let temp = Request::builder().uri("/temp").build().unwrap();
        assert_eq!(mux.dispatch(&temp).await.status(), StatusCode::FOUND);

        let perm = Request::builder().uri("/perm").build().unwrap();
        assert_eq!(
            mux.dispatch(&perm).await.status(),
            StatusCode::MOVED_PERMANENTLY
        );
    }
}
