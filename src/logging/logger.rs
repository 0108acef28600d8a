//! The error-log file writer.

use crate::http::Request;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::error;

/// Result type for logger operations.
pub type LogResult<T> = std::io::Result<T>;

/// Append-only JSON error log.
///
/// Each entry is one line of the form
/// `{"@timestamp": "<RFC 3339>", "@fields": {...}}`. The logger is an
/// explicit handle threaded through the router facade rather than
/// process-global state; failures to write are reported through
/// `tracing` and never propagate to the request path.
#[derive(Debug)]
pub struct ErrorLogger {
    file: Mutex<File>,
}

impl ErrorLogger {
    /// Open (or create) the log file at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> LogResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Write one entry with the given fields.
    pub fn log(&self, fields: Map<String, Value>) {
        let entry = json!({
            "@timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "@fields": Value::Object(fields),
        });

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{entry}") {
            error!(error = %e, "failed to write error log entry");
        }
    }

    /// Write one entry keyed to an inbound client request: the given
    /// fields plus the request method, URL, and Host header.
    pub fn log_from_request(&self, mut fields: Map<String, Value>, request: &Request) {
        fields.insert(
            "method".to_owned(),
            Value::String(request.method().to_string()),
        );
        fields.insert(
            "request_url".to_owned(),
            Value::String(request.uri().to_string()),
        );
        if let Some(host) = request.host() {
            fields.insert("host".to_owned(), Value::String(host.to_owned()));
        }
        self.log(fields);
    }
}
