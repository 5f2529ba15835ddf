//! Configuration management for the violation exporter
//!
//! Settings are layered, lowest priority first:
//! 1. Default values
//! 2. Configuration file (TOML format)
//! 3. Environment variables
//! 4. Command line flags (applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Namespace the policy controller emits its events into
pub const DEFAULT_EVENT_NAMESPACE: &str = "gatekeeper-system";

/// Port the metrics endpoint listens on
pub const DEFAULT_PORT: u16 = 8888;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Event source configuration
    pub kubernetes: KubernetesConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Event source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Path to a kubeconfig file; unset means in-cluster or inferred config
    pub kubeconfig: Option<PathBuf>,
    /// Namespace whose events are watched
    pub namespace: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines on the console instead of plain text
    pub json_format: bool,
    /// Directory for daily-rotated log files, console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            namespace: DEFAULT_EVENT_NAMESPACE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            log_dir: None,
        }
    }
}

impl ExporterConfig {
    /// Load configuration from the config file (explicit path or standard
    /// locations) and environment variables
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("VIOLATION_EXPORTER_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/violation-exporter/config.toml")),
            Some(PathBuf::from("./violation-exporter.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup, keyed by environment variable name.
    /// Values that do not parse are rejected rather than ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("VIOLATION_EXPORTER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("VIOLATION_EXPORTER_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::Validation(format!("VIOLATION_EXPORTER_PORT is not a port: {:?}", port))
            })?;
        }

        // Kubernetes
        if let Some(path) = lookup("KUBECONFIG").filter(|p| !p.is_empty()) {
            self.kubernetes.kubeconfig = Some(PathBuf::from(path));
        }
        if let Some(namespace) = lookup("VIOLATION_EXPORTER_NAMESPACE") {
            self.kubernetes.namespace = namespace;
        }

        // Logging
        if let Some(level) = lookup("VIOLATION_EXPORTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("VIOLATION_EXPORTER_LOG_JSON") {
            self.logging.json_format = json.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "VIOLATION_EXPORTER_LOG_JSON must be true or false: {:?}",
                    json
                ))
            })?;
        }
        if let Some(dir) = lookup("VIOLATION_EXPORTER_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        if self.kubernetes.namespace.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Event namespace cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the metrics server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Configuration validation failed
    #[error("Config validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ExporterConfig::default();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.kubernetes.namespace, "gatekeeper-system");
        assert!(config.kubernetes.kubeconfig.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.listen_addr(), "0.0.0.0:8888");
    }

    #[test]
    fn test_config_validation() {
        let config = ExporterConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_port = ExporterConfig::default();
        invalid_port.server.port = 0;
        assert!(invalid_port.validate().is_err());

        let mut invalid_namespace = ExporterConfig::default();
        invalid_namespace.kubernetes.namespace = "  ".to_string();
        assert!(invalid_namespace.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExporterConfig::from_toml(
            r#"
            [kubernetes]
            namespace = "policy-system"
            "#,
        )
        .unwrap();

        assert_eq!(config.kubernetes.namespace, "policy-system");
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = ExporterConfig::from_toml("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("VIOLATION_EXPORTER_PORT", "9100"),
            ("VIOLATION_EXPORTER_NAMESPACE", "opa"),
            ("KUBECONFIG", "/home/ops/.kube/config"),
            ("VIOLATION_EXPORTER_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ExporterConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.kubernetes.namespace, "opa");
        assert_eq!(
            config.kubernetes.kubeconfig,
            Some(PathBuf::from("/home/ops/.kube/config"))
        );
        assert!(config.logging.json_format);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_unparseable_port_is_rejected() {
        let mut config = ExporterConfig::default();
        let err = config
            .apply_overrides(|key| (key == "VIOLATION_EXPORTER_PORT").then(|| "http".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("VIOLATION_EXPORTER_PORT"));
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn test_unparseable_log_json_is_rejected() {
        let mut config = ExporterConfig::default();
        let err = config
            .apply_overrides(|key| (key == "VIOLATION_EXPORTER_LOG_JSON").then(|| "yes".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("VIOLATION_EXPORTER_LOG_JSON"));
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_empty_kubeconfig_env_is_ignored() {
        let mut config = ExporterConfig::default();
        config
            .apply_overrides(|key| (key == "KUBECONFIG").then(String::new))
            .unwrap();
        assert!(config.kubernetes.kubeconfig.is_none());
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = ExporterConfig::generate_sample();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[kubernetes]"));
        assert!(sample.contains("[logging]"));

        let parsed = ExporterConfig::from_toml(&sample).unwrap();
        assert_eq!(parsed, ExporterConfig::default());
    }
}
