//! Violation Exporter Library
//!
//! Watches policy controller events in a namespace and exports every
//! violation they describe as a Prometheus gauge.

// Core modules
pub mod config;
pub mod error;

// Event source
pub mod kubernetes;

// Event-to-metric translation
pub mod metrics;
pub mod violations;

// Application state
pub mod state;
pub use state::{AppState, WatchStatus};

// HTTP surface
pub mod health;
pub mod server;
pub mod shutdown;

// Logging configuration
pub mod logging;
