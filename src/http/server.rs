//! TCP accept loop and per-connection request handling.

use super::error::HttpResult;
use super::request::Request;
use super::response::Response;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// How long to wait for a complete request head and body.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on the total size of a single request (head plus body).
const MAX_REQUEST_BYTES: usize = 1_048_576;

/// A request sink: everything that can turn a request into a response.
///
/// The router facade implements this for proxied traffic; the admin
/// API implements it for the operations surface.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Produce a response for the given request.
    async fn dispatch(&self, request: &Request) -> Response;
}

/// An HTTP/1.1 server bound to a single listen address.
///
/// Each accepted connection is served on its own task; requests on a
/// connection are handed to the [`Dispatch`] implementor one at a
/// time, with keep-alive between them.
pub struct HttpServer {
    listener: TcpListener,
    dispatcher: Arc<dyn Dispatch>,
}

impl HttpServer {
    /// Bind a server to `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: &str, dispatcher: Arc<dyn Dispatch>) -> HttpResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    /// The address the server is actually listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be determined.
    pub fn local_addr(&self) -> HttpResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting fails fatally.
    pub async fn run(self) -> HttpResult<()> {
        let addr = self.listener.local_addr()?;
        info!(address = %addr, "listener started");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "new connection");
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        handle_connection(stream, peer, dispatcher).await;
                    });
                },
                Err(e) => {
                    warn!(error = %e, "accept error");
                },
            }
        }
    }
}

/// Serve requests on one connection until it closes or errors.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, dispatcher: Arc<dyn Dispatch>) {
    let mut buf = bytes::BytesMut::with_capacity(8192);

    loop {
        // Accumulate bytes until a complete request head is buffered.
        let (mut request, body_offset) = loop {
            match Request::parse(&buf) {
                Ok(Some(pair)) => break pair,
                Ok(None) => {},
                Err(e) => {
                    debug!(peer = %peer, error = %e, "failed to parse request");
                    let resp = Response::bad_request().text("Bad Request").build();
                    let _ = stream.write_all(&resp.serialize()).await;
                    return;
                },
            }

            if buf.len() > MAX_REQUEST_BYTES {
                let resp = Response::builder()
                    .status(http::StatusCode::PAYLOAD_TOO_LARGE)
                    .build();
                let _ = stream.write_all(&resp.serialize()).await;
                return;
            }

            match tokio::time::timeout(REQUEST_READ_TIMEOUT, stream.read_buf(&mut buf)).await {
                Ok(Ok(0)) => return,
                Ok(Ok(_)) => {},
                Ok(Err(e)) => {
                    debug!(peer = %peer, error = %e, "read error");
                    return;
                },
                Err(_) => {
                    debug!(peer = %peer, "read timeout");
                    return;
                },
            }
        };

        // Read the body, if the client declared one.
        let content_length = request.content_length().unwrap_or(0);
        let total = body_offset + content_length;
        if total > MAX_REQUEST_BYTES {
            let resp = Response::builder()
                .status(http::StatusCode::PAYLOAD_TOO_LARGE)
                .build();
            let _ = stream.write_all(&resp.serialize()).await;
            return;
        }
        while buf.len() < total {
            match tokio::time::timeout(REQUEST_READ_TIMEOUT, stream.read_buf(&mut buf)).await {
                Ok(Ok(0)) => return,
                Ok(Ok(_)) => {},
                Ok(Err(_)) | Err(_) => return,
            }
        }

        // Detach this request's bytes; pipelined bytes stay buffered.
        let mut consumed = buf.split_to(total);
        if content_length > 0 {
            request.set_body(consumed.split_off(body_offset).freeze());
        }

        request.set_remote_addr(peer.to_string());
        request.set_header("x-forwarded-for", peer.ip().to_string());

        let keep_alive = request.is_keep_alive();
        let response = dispatcher.dispatch(&request).await;

        debug!(
            peer = %peer,
            method = %request.method(),
            path = %request.path(),
            status = %response.status().as_u16(),
            "request served"
        );

        if let Err(e) = stream.write_all(&response.serialize()).await {
            debug!(peer = %peer, error = %e, "write error");
            return;
        }

        if !keep_alive {
            return;
        }
    }
}
