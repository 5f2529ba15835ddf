//! Kubernetes client construction
//!
//! Builds a kube-rs `Client` from an explicit kubeconfig path, or falls back
//! to in-cluster / default inference when no path is configured.

use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::{ExporterError, ExporterResult};

/// Wrapper around kube-rs Client that remembers where it connects to
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    api_server: String,
}

impl K8sClient {
    /// Create a client from the configured kubeconfig path, or infer one
    pub async fn connect(kubeconfig: Option<&Path>) -> ExporterResult<Self> {
        match kubeconfig {
            Some(path) => Self::from_kubeconfig_file(path).await,
            None => Self::infer().await,
        }
    }

    /// Create client from a kubeconfig file using its current context
    pub async fn from_kubeconfig_file(path: &Path) -> ExporterResult<Self> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            ExporterError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| ExporterError::Kubeconfig(format!("Failed to create config: {}", e)))?;

        Self::from_config(config)
    }

    /// In-cluster service account first, then the default kubeconfig
    pub async fn infer() -> ExporterResult<Self> {
        let config = Config::infer()
            .await
            .map_err(|e| ExporterError::Kubeconfig(format!("Failed to infer config: {}", e)))?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> ExporterResult<Self> {
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config)?;

        Ok(Self {
            inner: client,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("api_server", &self.api_server)
            .finish()
    }
}
