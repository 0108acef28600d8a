//! The router facade.

use super::loader::RouteLoader;
use crate::catalog::RouteCatalog;
use crate::http::{Dispatch, Request, Response};
use crate::logging::ErrorLogger;
use crate::mux::Mux;
use async_trait::async_trait;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Counters reported by the `/stats` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStats {
    /// Number of routes registered into the active mux.
    pub count: usize,
    /// Hex SHA-1 fingerprint of the active route set.
    pub checksum: String,
}

/// Front door for all proxied traffic.
///
/// Holds the single mutable reference to the active mux. A request
/// clones the `Arc` once on entry and keeps that table for its whole
/// lifetime; `reload_routes` builds a replacement off the hot path and
/// flips the reference. The pointer flip is the only synchronization
/// point between the two.
pub struct Router {
    mux: RwLock<Arc<Mux>>,
    reload_lock: Mutex<()>,
    catalog: Arc<dyn RouteCatalog>,
    loader: RouteLoader,
    logger: Arc<ErrorLogger>,
}

impl Router {
    /// Create a router with an empty routing table. Call
    /// [`Router::reload_routes`] to perform the initial load.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn RouteCatalog>,
        logger: Arc<ErrorLogger>,
        backend_connect_timeout: Duration,
        backend_header_timeout: Duration,
    ) -> Self {
        Self {
            mux: RwLock::new(Arc::new(Mux::new())),
            reload_lock: Mutex::new(()),
            loader: RouteLoader::new(
                backend_connect_timeout,
                backend_header_timeout,
                Arc::clone(&logger),
            ),
            catalog,
            logger,
        }
    }

    /// The currently-active routing table.
    ///
    /// The returned `Arc` stays valid (and unchanged) for as long as
    /// the caller holds it, regardless of concurrent reloads.
    pub async fn active_mux(&self) -> Arc<Mux> {
        Arc::clone(&*self.mux.read().await)
    }

    /// Rebuild the routing table from the catalog and swap it in.
    ///
    /// Backends load first, routes second. On any failure (catalog
    /// I/O, malformed data, or a panic out of the loader) the
    /// previous table stays live and the failure is logged. Reloads
    /// are serialized; callers may invoke this concurrently.
    pub async fn reload_routes(&self) {
        let _guard = self.reload_lock.lock().await;

        info!("reloading routes");
        let built = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.loader.build(self.catalog.as_ref())
        }));

        match built {
            Ok(Ok(mux)) => {
                let count = mux.route_count();
                let checksum = mux.route_checksum();
                *self.mux.write().await = Arc::new(mux);
                info!(count, checksum = %checksum, "routes reloaded");
            },
            Ok(Err(e)) => {
                warn!(error = %e, "route reload failed, keeping previous routes");
            },
            Err(panic) => {
                warn!(
                    panic = %panic_message(panic.as_ref()),
                    "recovered from panic during route reload, keeping previous routes"
                );
            },
        }
    }

    /// Count and fingerprint of the active table.
    pub async fn route_stats(&self) -> RouteStats {
        let mux = self.active_mux().await;
        RouteStats {
            count: mux.route_count(),
            checksum: mux.route_checksum(),
        }
    }
}

#[async_trait]
impl Dispatch for Router {
    /// Serve one request through the active mux, converting a handler
    /// panic into a logged 500.
    async fn dispatch(&self, request: &Request) -> Response {
        let mux = self.active_mux().await;

        match AssertUnwindSafe(mux.dispatch(request)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(
                    panic = %message,
                    method = %request.method(),
                    path = %request.path(),
                    "recovered from panic while serving request"
                );

                let mut fields = Map::new();
                fields.insert(
                    "error".to_owned(),
                    Value::String(format!("panic: {message}")),
                );
                fields.insert("status".to_owned(), Value::from(500));
                self.logger.log_from_request(fields, request);

                Response::internal_error().build()
            },
        }
    }
}

/// Render a panic payload for logging.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
