//! HTTP server for the pack publication service.
//!
//! The binary lives in `main.rs`; the router, state and metrics are
//! exposed as a library so integration tests can drive the full stack
//! in-process.

pub mod api;
pub mod metrics;
pub mod state;
