//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration variable did not parse.
    #[error("Invalid duration in {name}: {value:?} (expected e.g. 150ms, 1s, 2m)")]
    InvalidDuration {
        /// The environment variable.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
