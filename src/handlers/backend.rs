//! Reverse-proxy handler for a named upstream backend.

use super::error::{HandlerError, HandlerResult};
use super::Handler;
use crate::http::{HttpError, HttpResult, Request, Response};
use crate::logging::ErrorLogger;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{StatusCode, Uri};
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::warn;

/// Forwards requests to one upstream HTTP service.
///
/// The connect timeout bounds dialing; the header timeout bounds the
/// wait for the upstream status line and headers. Body reads are
/// unbounded, as with the inbound side. Upstream failures become 502
/// (unreachable or misbehaving) or 504 (header timeout) and an
/// error-log entry.
#[derive(Debug)]
pub struct BackendHandler {
    backend_id: String,
    authority: String,
    host_header: String,
    connect_timeout: Duration,
    header_timeout: Duration,
    logger: Arc<ErrorLogger>,
}

impl BackendHandler {
    /// Build a handler from a backend record's URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, has no host, or
    /// uses a scheme other than plain `http`.
    pub fn new(
        backend_id: impl Into<String>,
        backend_url: &str,
        connect_timeout: Duration,
        header_timeout: Duration,
        logger: Arc<ErrorLogger>,
    ) -> HandlerResult<Self> {
        let uri: Uri = backend_url
            .parse()
            .map_err(|e: http::uri::InvalidUri| HandlerError::InvalidBackendUrl {
                url: backend_url.to_owned(),
                reason: e.to_string(),
            })?;

        match uri.scheme_str() {
            Some("http") | None => {},
            Some(scheme) => {
                return Err(HandlerError::UnsupportedScheme {
                    url: backend_url.to_owned(),
                    scheme: scheme.to_owned(),
                })
            },
        }

        let host = uri.host().ok_or_else(|| HandlerError::InvalidBackendUrl {
            url: backend_url.to_owned(),
            reason: "missing host".to_owned(),
        })?;
        let port = uri.port_u16().unwrap_or(80);

        Ok(Self {
            backend_id: backend_id.into(),
            authority: format!("{host}:{port}"),
            host_header: uri
                .authority()
                .map(ToString::to_string)
                .unwrap_or_else(|| host.to_owned()),
            connect_timeout,
            header_timeout,
            logger,
        })
    }

    /// The backend this handler forwards to.
    #[must_use]
    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    async fn forward(&self, request: &Request) -> HttpResult<Response> {
        let mut upstream = request.clone();
        upstream.set_header("host", &self.host_header);
        upstream.set_header("connection", "close");
        upstream.remove_header("keep-alive");

        let mut stream = match tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(&self.authority),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(HttpError::Io(e)),
            Err(_) => {
                return Err(HttpError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connect timed out",
                )))
            },
        };

        stream.write_all(&upstream.serialize()).await?;

        // Response head, bounded by the header timeout.
        let mut buf = BytesMut::with_capacity(8192);
        let deadline = tokio::time::Instant::now() + self.header_timeout;
        let (mut response, body_offset) = loop {
            if let Some(pair) = Response::parse(&buf)? {
                break pair;
            }
            let n = tokio::time::timeout_at(deadline, stream.read_buf(&mut buf))
                .await
                .map_err(|_| HttpError::Timeout("upstream response headers".to_owned()))??;
            if n == 0 {
                return Err(HttpError::ConnectionClosed);
            }
        };

        let body = if let Some(length) = response.content_length() {
            while buf.len() < body_offset + length {
                let n = stream.read_buf(&mut buf).await?;
                if n == 0 {
                    return Err(HttpError::ConnectionClosed);
                }
            }
            buf.freeze().slice(body_offset..body_offset + length)
        } else if is_chunked(&response) {
            loop {
                if let Some(decoded) = decode_chunked(&buf[body_offset..])? {
                    break decoded;
                }
                let n = stream.read_buf(&mut buf).await?;
                if n == 0 {
                    return Err(HttpError::Parse("truncated chunked body".to_owned()));
                }
            }
        } else {
            // No framing: the upstream signals the end by closing.
            loop {
                let n = stream.read_buf(&mut buf).await?;
                if n == 0 {
                    break;
                }
            }
            buf.freeze().slice(body_offset..)
        };

        response.remove_header("connection");
        response.remove_header("keep-alive");
        response.remove_header("transfer-encoding");
        response.set_header("content-length", body.len().to_string());
        response.set_body(body);
        Ok(response)
    }
}

#[async_trait]
impl Handler for BackendHandler {
    async fn call(&self, request: &Request) -> Response {
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                let status = match e {
                    HttpError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                warn!(
                    backend_id = %self.backend_id,
                    error = %e,
                    status = status.as_u16(),
                    "upstream request failed"
                );

                let mut fields = Map::new();
                fields.insert("error".to_owned(), Value::String(e.to_string()));
                fields.insert("status".to_owned(), Value::from(status.as_u16()));
                fields.insert(
                    "backend_id".to_owned(),
                    Value::String(self.backend_id.clone()),
                );
                self.logger.log_from_request(fields, request);

                Response::builder().status(status).build()
            },
        }
    }
}

fn is_chunked(response: &Response) -> bool {
    response
        .header("transfer-encoding")
        .map(|v| v.to_ascii_lowercase().contains("chunked"))
        .unwrap_or(false)
}

/// Decode a chunked transfer-encoded body.
///
/// Returns `Ok(None)` while the buffer is still incomplete. Trailers
/// after the terminal chunk are discarded.
fn decode_chunked(data: &[u8]) -> HttpResult<Option<Bytes>> {
    let mut out = BytesMut::new();
    let mut rest = data;

    loop {
        let Some(line_end) = find_crlf(rest) else {
            return Ok(None);
        };
        let size_line = std::str::from_utf8(&rest[..line_end])
            .map_err(|_| HttpError::Parse("invalid chunk size".to_owned()))?;
        let size_token = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_token, 16)
            .map_err(|_| HttpError::Parse("invalid chunk size".to_owned()))?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            return Ok(Some(out.freeze()));
        }
        if rest.len() < size + 2 {
            return Ok(None);
        }
        out.extend_from_slice(&rest[..size]);
        rest = &rest[size + 2..];
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}
