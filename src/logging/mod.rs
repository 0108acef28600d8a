//! Structured JSON error logging.
//!
//! Operational logging goes through `tracing`; this module is the
//! append-only JSON error log consumed by operators line-by-line.

mod logger;

pub use logger::{ErrorLogger, LogResult};
