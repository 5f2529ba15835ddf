//! Liveness and readiness probes
//!
//! The exporter is alive as long as it serves HTTP. It is ready while the
//! event watch is still delivering events; once the stream ends the exported
//! values go stale and the readiness probe says so.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Liveness probe response (for k8s/container orchestration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub alive: bool,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: i64,
}

/// Readiness probe response (for k8s/container orchestration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub reason: Option<String>,
    pub timestamp: i64,
}

/// Probe responder
pub struct HealthChecker {
    start_time: Instant,
    version: String,
}

impl HealthChecker {
    pub fn new(version: &str) -> Self {
        Self {
            start_time: Instant::now(),
            version: version.to_string(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Simple liveness check - is the service running?
    pub fn liveness(&self) -> LivenessResponse {
        LivenessResponse {
            alive: true,
            version: self.version.clone(),
            uptime_seconds: self.uptime_seconds(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Ready while the event watch is active
    pub fn readiness(&self, watch_active: bool) -> ReadinessResponse {
        ReadinessResponse {
            ready: watch_active,
            reason: (!watch_active).then(|| "Event watch is not running".to_string()),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness() {
        let checker = HealthChecker::new("0.1.0");
        let response = checker.liveness();

        assert!(response.alive);
        assert_eq!(response.version, "0.1.0");
        assert!(response.timestamp > 0);
    }

    #[test]
    fn test_readiness_follows_watch() {
        let checker = HealthChecker::new("0.1.0");

        let ready = checker.readiness(true);
        assert!(ready.ready);
        assert!(ready.reason.is_none());

        let not_ready = checker.readiness(false);
        assert!(!not_ready.ready);
        assert_eq!(not_ready.reason.as_deref(), Some("Event watch is not running"));
    }
}
