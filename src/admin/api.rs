//! Admin endpoint dispatch.

use crate::http::{Dispatch, Request, Response};
use crate::router::{RouteStats, Router};
use async_trait::async_trait;
use http::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Serialize)]
struct StatsPayload {
    routes: RouteStats,
}

/// The operations API.
///
/// | Path | Method | Behavior |
/// |---|---|---|
/// | `/reload` | POST | Reload the routing table |
/// | `/healthcheck` | GET | `OK` |
/// | `/stats` | GET | Route count and fingerprint as JSON |
///
/// A known path hit with the wrong method gets 405 with an `Allow`
/// header; unknown paths get 404.
pub struct AdminApi {
    router: Arc<Router>,
}

impl AdminApi {
    /// Create the API over the given router.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    async fn reload(&self, request: &Request) -> Response {
        if request.method() != Method::POST {
            return Response::method_not_allowed("POST").build();
        }

        info!("reload requested through admin API");
        self.router.reload_routes().await;
        Response::ok().build()
    }

    fn healthcheck(&self, request: &Request) -> Response {
        if request.method() != Method::GET {
            return Response::method_not_allowed("GET").build();
        }

        Response::ok().text("OK").build()
    }

    async fn stats(&self, request: &Request) -> Response {
        if request.method() != Method::GET {
            return Response::method_not_allowed("GET").build();
        }

        let payload = StatsPayload {
            routes: self.router.route_stats().await,
        };
        match serde_json::to_string(&payload) {
            Ok(mut body) => {
                body.push('\n');
                Response::ok().json(body).build()
            },
            Err(e) => {
                error!(error = %e, "failed to serialize stats");
                Response::internal_error().build()
            },
        }
    }
}

#[async_trait]
impl Dispatch for AdminApi {
    async fn dispatch(&self, request: &Request) -> Response {
        match request.path() {
            "/reload" => self.reload(request).await,
            "/healthcheck" => self.healthcheck(request),
            "/stats" => self.stats(request).await,
            _ => Response::not_found().build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, RouteRecord};
    use crate::logging::ErrorLogger;
    use http::StatusCode;
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_api(routes: Vec<RouteRecord>) -> (AdminApi, Arc<Router>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let logger = Arc::new(ErrorLogger::open(dir.path().join("error.log")).unwrap());
        let router = Arc::new(Router::new(
            Arc::new(MemoryCatalog::new(Vec::new(), routes)),
            logger,
            Duration::from_secs(1),
            Duration::from_secs(15),
        ));
        (AdminApi::new(Arc::clone(&router)), router, dir)
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder().method(method).uri(uri).build().unwrap()
    }

    fn gone(path: &str) -> RouteRecord {
        RouteRecord {
            incoming_path: path.to_owned(),
            route_type: String::new(),
            handler: "gone".to_owned(),
            backend_id: None,
            redirect_to: None,
            redirect_type: None,
        }
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let (api, _router, _dir) = test_api(Vec::new());

        let response = api.dispatch(&request(Method::GET, "/healthcheck")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], b"OK");
    }

    #[tokio::test]
    async fn test_healthcheck_wrong_method() {
        let (api, _router, _dir) = test_api(Vec::new());

        let response = api.dispatch(&request(Method::POST, "/healthcheck")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET"));
    }

    #[tokio::test]
    async fn test_reload_populates_routes() {
        let (api, router, _dir) = test_api(vec![gone("/retired")]);
        assert_eq!(router.route_stats().await.count, 0);

        let response = api.dispatch(&request(Method::POST, "/reload")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(router.route_stats().await.count, 1);
    }

    #[tokio::test]
    async fn test_reload_requires_post() {
        let (api, _router, _dir) = test_api(Vec::new());

        let response = api.dispatch(&request(Method::GET, "/reload")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("POST"));
    }

    #[tokio::test]
    async fn test_stats_shape() {
        let (api, _router, _dir) = test_api(vec![gone("/retired")]);
        api.dispatch(&request(Method::POST, "/reload")).await;

        let response = api.dispatch(&request(Method::GET, "/stats")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = String::from_utf8_lossy(response.body()).to_string();
        assert!(body.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["routes"]["count"], 1);
        assert_eq!(parsed["routes"]["checksum"].as_str().unwrap().len(), 40);
    }

    #[tokio::test]
    async fn test_stats_requires_get() {
        let (api, _router, _dir) = test_api(Vec::new());

        let response = api.dispatch(&request(Method::POST, "/stats")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("GET"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (api, _router, _dir) = test_api(Vec::new());

        let response = api.dispatch(&request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
