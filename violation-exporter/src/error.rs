//! Exporter error types
//!
//! Setup failures bubble up through these variants to `main`, which treats
//! every one of them as fatal.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while wiring up the exporter
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Kubeconfig could not be read or turned into a client config
    #[error("Invalid kubeconfig: {0}")]
    Kubeconfig(String),

    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Listener or filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for exporter setup
pub type ExporterResult<T> = std::result::Result<T, ExporterError>;
