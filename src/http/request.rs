//! HTTP request parsing and serialization.

use super::error::{HttpError, HttpResult};
use bytes::{Bytes, BytesMut};
use http::{Method, Uri, Version};
use std::collections::HashMap;
use std::str::FromStr;

/// Maximum number of headers to parse.
const MAX_HEADERS: usize = 100;

/// A parsed HTTP request.
///
/// Header names are stored lowercased. The body is attached separately
/// once the connection loop has read it (see [`Request::set_body`]).
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HashMap<String, String>,
    body: Bytes,
    remote_addr: Option<String>,
}

impl Request {
    /// Create a new request builder.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request URI (origin form: path and optional query).
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get the HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Get all headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get the Host header.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }

    /// Get the Content-Length header as a usize.
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|s| s.parse().ok())
    }

    /// Get the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Attach the request body.
    pub fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    /// Set a header value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_lowercase())
    }

    /// Get the peer address, if known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// Record the peer address.
    pub fn set_remote_addr(&mut self, addr: impl Into<String>) {
        self.remote_addr = Some(addr.into());
    }

    /// Check whether the connection should be kept alive after this
    /// request.
    #[must_use]
    pub fn is_keep_alive(&self) -> bool {
        match self.version {
            Version::HTTP_11 => self
                .header("connection")
                .map(|v| !v.eq_ignore_ascii_case("close"))
                .unwrap_or(true),
            Version::HTTP_10 => self
                .header("connection")
                .map(|v| v.eq_ignore_ascii_case("keep-alive"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Try to parse a request head from `data`.
    ///
    /// Returns `Ok(None)` if the buffer does not yet hold a complete
    /// head, so the caller can read more bytes and retry. On success
    /// the returned offset is the index of the first body byte.
    pub fn parse(data: &[u8]) -> HttpResult<Option<(Self, usize)>> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        match req.parse(data)? {
            httparse::Status::Complete(body_offset) => {
                let method = Method::from_str(req.method.unwrap_or("GET"))
                    .map_err(|e| HttpError::InvalidMethod(e.to_string()))?;

                let uri = Uri::from_str(req.path.unwrap_or("/"))
                    .map_err(|e| HttpError::InvalidUri(e.to_string()))?;

                let version = match req.version {
                    Some(0) => Version::HTTP_10,
                    _ => Version::HTTP_11,
                };

                let mut headers_map = HashMap::new();
                for header in req.headers.iter() {
                    headers_map.insert(
                        header.name.to_lowercase(),
                        String::from_utf8_lossy(header.value).to_string(),
                    );
                }

                Ok(Some((
                    Request {
                        method,
                        uri,
                        version,
                        headers: headers_map,
                        body: Bytes::new(),
                        remote_addr: None,
                    },
                    body_offset,
                )))
            },
            httparse::Status::Partial => Ok(None),
        }
    }

    /// Serialize the request for forwarding upstream.
    #[must_use]
    pub fn serialize(&self) -> BytesMut {
        let mut buf = BytesMut::new();

        buf.extend_from_slice(format!("{} {} HTTP/1.1\r\n", self.method, self.uri).as_bytes());

        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }

        if !self.body.is_empty() && !self.headers.contains_key("content-length") {
            buf.extend_from_slice(format!("content-length: {}\r\n", self.body.len()).as_bytes());
        }

        buf.extend_from_slice(b"\r\n");

        if !self.body.is_empty() {
            buf.extend_from_slice(&self.body);
        }

        buf
    }
}

/// Builder for HTTP requests, used by handlers and tests.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl RequestBuilder {
    /// Create a new request builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the request URI.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI does not parse.
    pub fn build(self) -> HttpResult<Request> {
        let uri = match self.uri {
            Some(raw) => {
                Uri::from_str(&raw).map_err(|e| HttpError::InvalidUri(e.to_string()))?
            },
            None => Uri::from_static("/"),
        };

        Ok(Request {
            method: self.method.unwrap_or(Method::GET),
            uri,
            version: Version::HTTP_11,
            headers: self.headers,
            body: self.body,
            remote_addr: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_request() {
        let data = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let (req, offset) = Request::parse(data).unwrap().unwrap();

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/index.html");
        assert_eq!(req.host(), Some("example.com"));
        assert_eq!(offset, data.len());
    }

    #[test]
    fn test_parse_partial_request() {
        let data = b"GET /index.html HTTP/1.1\r\nHost: exa";
        assert!(Request::parse(data).unwrap().is_none());
    }

    #[test]
    fn test_parse_query() {
        let data = b"GET /search?q=rust&page=2 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let (req, _) = Request::parse(data).unwrap().unwrap();

        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust&page=2"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Request::parse(b"\x00\x01\x02\r\n\r\n").is_err());
    }

    #[test]
    fn test_keep_alive() {
        let (req, _) = Request::parse(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n")
            .unwrap()
            .unwrap();
        assert!(req.is_keep_alive());

        let (req, _) = Request::parse(b"GET / HTTP/1.1\r\nHost: a\r\nConnection: close\r\n\r\n")
            .unwrap()
            .unwrap();
        assert!(!req.is_keep_alive());

        let (req, _) = Request::parse(b"GET / HTTP/1.0\r\nHost: a\r\n\r\n")
            .unwrap()
            .unwrap();
        assert!(!req.is_keep_alive());
    }

    #[test]
    fn test_serialize_round_trip() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/things?v=1")
            .header("Host", "internal")
            .body(Bytes::from_static(b"{}"))
            .build()
            .unwrap();

        let wire = req.serialize();
        let s = String::from_utf8_lossy(&wire);
        assert!(s.starts_with("POST /api/things?v=1 HTTP/1.1\r\n"));
        assert!(s.contains("host: internal\r\n"));
        assert!(s.contains("content-length: 2\r\n"));
        assert!(s.ends_with("{}"));
    }

    #[test]
    fn test_header_manipulation() {
        let mut req = Request::builder().uri("/").build().unwrap();
        req.set_header("X-Forwarded-For", "10.0.0.1");
        assert_eq!(req.header("x-forwarded-for"), Some("10.0.0.1"));

        req.remove_header("X-Forwarded-For");
        assert!(req.header("x-forwarded-for").is_none());
    }
}
