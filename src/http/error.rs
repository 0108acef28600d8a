//! Error types for the HTTP layer.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading, parsing, or writing HTTP.
#[derive(Debug, Error)]
pub enum HttpError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// HTTP parsing error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid HTTP method.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Invalid URI.
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Request exceeded the configured size cap.
    #[error("Request too large: {size} bytes (max: {max})")]
    RequestTooLarge {
        /// Actual size.
        size: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Peer closed the connection mid-message.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Timed out waiting for the peer.
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

impl From<httparse::Error> for HttpError {
    fn from(err: httparse::Error) -> Self {
        HttpError::Parse(err.to_string())
    }
}
