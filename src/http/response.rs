//! HTTP response building and serialization.

use super::error::HttpResult;
use bytes::{Bytes, BytesMut};
use http::StatusCode;
use std::collections::HashMap;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Create a new response builder.
    #[must_use]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Create an OK (200) response.
    #[must_use]
    pub fn ok() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::OK)
    }

    /// Create a Bad Request (400) response.
    #[must_use]
    pub fn bad_request() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::BAD_REQUEST)
    }

    /// Create a Not Found (404) response.
    #[must_use]
    pub fn not_found() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::NOT_FOUND)
    }

    /// Create a Method Not Allowed (405) response advertising the
    /// single allowed method.
    #[must_use]
    pub fn method_not_allowed(allow: &str) -> ResponseBuilder {
        ResponseBuilder::new()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("allow", allow)
    }

    /// Create a Gone (410) response.
    #[must_use]
    pub fn gone() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::GONE)
    }

    /// Create an Internal Server Error (500) response.
    #[must_use]
    pub fn internal_error() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create a Bad Gateway (502) response.
    #[must_use]
    pub fn bad_gateway() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::BAD_GATEWAY)
    }

    /// Create a Gateway Timeout (504) response.
    #[must_use]
    pub fn gateway_timeout() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::GATEWAY_TIMEOUT)
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
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

    /// Get the Content-Length header as a usize.
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|s| s.parse().ok())
    }

    /// Get the response body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replace the response body.
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

    /// Serialize the response to wire bytes.
    #[must_use]
    pub fn serialize(&self) -> BytesMut {
        let mut buf = BytesMut::new();

        buf.extend_from_slice(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or("")
            )
            .as_bytes(),
        );

        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }

        if !self.headers.contains_key("content-length") {
            buf.extend_from_slice(format!("content-length: {}\r\n", self.body.len()).as_bytes());
        }

        buf.extend_from_slice(b"\r\n");

        if !self.body.is_empty() {
            buf.extend_from_slice(&self.body);
        }

        buf
    }

    /// Try to parse a response head from `data`.
    ///
    /// Returns `Ok(None)` if the buffer does not yet hold a complete
    /// head. On success the returned offset is the index of the first
    /// body byte.
    pub fn parse(data: &[u8]) -> HttpResult<Option<(Self, usize)>> {
        let mut headers = [httparse::EMPTY_HEADER; 100];
        let mut resp = httparse::Response::new(&mut headers);

        match resp.parse(data)? {
            httparse::Status::Complete(body_offset) => {
                let status = StatusCode::from_u16(resp.code.unwrap_or(200))
                    .unwrap_or(StatusCode::BAD_GATEWAY);

                let mut headers_map = HashMap::new();
                for header in resp.headers.iter() {
                    headers_map.insert(
                        header.name.to_lowercase(),
                        String::from_utf8_lossy(header.value).to_string(),
                    );
                }

                Ok(Some((
                    Response {
                        status,
                        headers: headers_map,
                        body: Bytes::new(),
                    },
                    body_offset,
                )))
            },
            httparse::Status::Partial => Ok(None),
        }
    }
}

/// Builder for HTTP responses.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Create a new response builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set the status code.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set the response body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a text body with Content-Type: text/plain.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.header("content-type", "text/plain; charset=utf-8")
            .body(Bytes::from(text))
    }

    /// Set a JSON body with Content-Type: application/json.
    #[must_use]
    pub fn json(self, json: impl Into<String>) -> Self {
        let json = json.into();
        self.header("content-type", "application/json")
            .body(Bytes::from(json))
    }

    /// Build the response.
    #[must_use]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
