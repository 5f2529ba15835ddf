//! Application State
//!
//! Shared state between the event pipeline and the HTTP server

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::health::HealthChecker;
use crate::metrics::ViolationRegistry;

/// Whether the event watch is still delivering events
#[derive(Debug, Default)]
pub struct WatchStatus {
    active: AtomicBool,
}

impl WatchStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_started(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn mark_ended(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Handles shared by the axum handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ViolationRegistry>,
    pub watch_status: Arc<WatchStatus>,
    pub health: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(registry: Arc<ViolationRegistry>, watch_status: Arc<WatchStatus>) -> Self {
        Self {
            registry,
            watch_status,
            health: Arc::new(HealthChecker::new(env!("CARGO_PKG_VERSION"))),
        }
    }
}
