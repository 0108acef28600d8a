//! Error types for catalog access.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the route catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        /// Path of the catalog document.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The catalog document did not parse.
    #[error("Malformed catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog went away mid-read (injected in tests).
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
