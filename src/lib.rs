//! # Pathgate
//!
//! A front-end HTTP reverse proxy that dispatches requests to internal
//! backend services based on the request path.
//!
//! ## Features
//!
//! - Exact, prefix, and suffix routes in a single namespace with a
//!   fixed match precedence (suffix, then exact, then prefix)
//! - Hot reload: the routing table is rebuilt off the hot path and
//!   swapped atomically, without dropping in-flight requests
//! - SHA-1 route-set fingerprint for operational verification
//! - Crash isolation: a panicking handler or a malformed reload never
//!   takes down the process
//!
//! ## Architecture
//!
//! Requests flow through the [`router::Router`] facade into the active
//! [`mux::Mux`], which consults three per-segment tries and invokes the
//! matched [`handlers::Handler`]. The [`router`] module owns reloads:
//! it builds a fresh mux from the [`catalog`] and flips the active
//! pointer. The [`admin`] module exposes reload, healthcheck, and stats
//! endpoints on a separate listener.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod mux;
pub mod router;
pub mod trie;

pub use config::Settings;
pub use http::HttpServer;
pub use router::Router;
