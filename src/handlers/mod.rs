//! Request handlers produced by the route loader.
//!
//! The multiplexer treats handlers as opaque values; the loader
//! resolves each catalog record to one of the concrete kinds here:
//! backend proxy, redirect, gone, or the diagnostic boom handler.

mod backend;
mod error;
mod redirect;

pub use backend::BackendHandler;
pub use error::{HandlerError, HandlerResult};
pub use redirect::RedirectHandler;

use crate::http::{Request, Response};
use async_trait::async_trait;
use std::fmt;

/// Something that can answer a request.
#[async_trait]
pub trait Handler: Send + Sync + fmt::Debug {
    /// Produce a response for the given request.
    async fn call(&self, request: &Request) -> Response;
}

/// Responds 410 for routes whose content has been retired.
#[derive(Debug, Default)]
pub struct GoneHandler;

#[async_trait]
impl Handler for GoneHandler {
    async fn call(&self, _request: &Request) -> Response {
        Response::gone().build()
    }
}

/// Panics on invocation.
///
/// Registered through the `boom` handler kind so that the dispatch
/// recovery barrier can be exercised end-to-end.
#[derive(Debug, Default)]
pub struct BoomHandler;

#[async_trait]
impl Handler for BoomHandler {
    async fn call(&self, _request: &Request) -> Response {
        panic!("Boom!!!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn test_gone_responds_410() {
        let request = Request::builder().uri("/old").build().unwrap();
        let response = GoneHandler.call(&request).await;
        assert_eq!(response.status(), StatusCode::GONE);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    #[should_panic(expected = "Boom!!!")]
    async fn test_boom_panics() {
        let request = Request::builder().uri("/boom").build().unwrap();
        BoomHandler.call(&request).await;
    }
}
