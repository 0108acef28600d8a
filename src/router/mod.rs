//! The router facade and route loader.
//!
//! [`Router`] owns the single mutable reference to the active
//! [`crate::mux::Mux`] and coordinates reloads: [`RouteLoader`] builds
//! a fresh mux from the catalog off the hot path, and the facade flips
//! the reference. Recovery barriers around dispatch and reload keep
//! handler panics and bad reloads from taking the process down.

mod loader;
mod router;

pub use loader::RouteLoader;
pub use router::{RouteStats, Router};
