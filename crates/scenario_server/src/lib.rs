//! REST API server for financial scenario analytics
//!
//! This crate provides an HTTP REST API over `scenario_core` and
//! `scenario_narrative`, exposing scenario impact, sensitivity, forecasting,
//! data quality and narrative endpoints, plus the subscription and contact
//! form backend.

pub mod config;
pub mod routes;
pub mod server;

// Re-export scenario dependencies for integration
pub use scenario_core;
pub use scenario_narrative;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
