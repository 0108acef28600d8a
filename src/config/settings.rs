//! Runtime settings.

use super::error::{ConfigError, ConfigResult};
use std::path::PathBuf;
use std::time::Duration;

/// Everything the process needs at startup. Each field has a default
/// used when its environment variable is unset.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address for proxied traffic (`PATHGATE_PUB_ADDR`).
    pub public_addr: String,
    /// Listen address for the admin API (`PATHGATE_API_ADDR`).
    pub api_addr: String,
    /// Path of the route catalog document (`PATHGATE_CATALOG_PATH`).
    pub catalog_path: PathBuf,
    /// Upstream connect timeout (`PATHGATE_BACKEND_CONNECT_TIMEOUT`).
    pub backend_connect_timeout: Duration,
    /// Upstream response-header timeout
    /// (`PATHGATE_BACKEND_HEADER_TIMEOUT`).
    pub backend_header_timeout: Duration,
    /// Path of the JSON error log (`PATHGATE_ERROR_LOG`).
    pub error_log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_addr: "0.0.0.0:8080".to_owned(),
            api_addr: "0.0.0.0:8081".to_owned(),
            catalog_path: PathBuf::from("routes.json"),
            backend_connect_timeout: Duration::from_secs(1),
            backend_header_timeout: Duration::from_secs(15),
            error_log_path: PathBuf::from("pathgate-error.log"),
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout variable is set to something that
    /// does not parse as a duration.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            public_addr: env_default("PATHGATE_PUB_ADDR", &defaults.public_addr),
            api_addr: env_default("PATHGATE_API_ADDR", &defaults.api_addr),
            catalog_path: PathBuf::from(env_default(
                "PATHGATE_CATALOG_PATH",
                "routes.json",
            )),
            backend_connect_timeout: env_duration(
                "PATHGATE_BACKEND_CONNECT_TIMEOUT",
                defaults.backend_connect_timeout,
            )?,
            backend_header_timeout: env_duration(
                "PATHGATE_BACKEND_HEADER_TIMEOUT",
                defaults.backend_header_timeout,
            )?,
            error_log_path: PathBuf::from(env_default(
                "PATHGATE_ERROR_LOG",
                "pathgate-error.log",
            )),
        })
    }
}

fn env_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn env_duration(name: &str, default: Duration) -> ConfigResult<Duration> {
    match std::env::var(name) {
        Ok(value) => parse_duration(&value).ok_or_else(|| ConfigError::InvalidDuration {
            name: name.to_owned(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Parse durations of the form `150ms`, `1s`, or `2m`. A bare number
/// is taken as seconds.
#[must_use]
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();

    let (digits, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(split) => value.split_at(split),
        None => (value, "s"),
    };
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount * 60)),
        _ => None,
    }
}
