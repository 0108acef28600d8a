//! Error types for handler construction.

use thiserror::Error;

/// Errors that can occur while building a handler from catalog data.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The backend URL did not parse.
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidBackendUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend URL uses a scheme the proxy cannot speak.
    #[error("Unsupported scheme {scheme} in backend URL {url}")]
    UnsupportedScheme {
        /// The offending URL.
        url: String,
        /// The rejected scheme.
        scheme: String,
    },
}

/// Result type for handler construction.
pub type HandlerResult<T> = Result<T, HandlerError>;
