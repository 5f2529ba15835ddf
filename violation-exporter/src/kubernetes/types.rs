//! Event model consumed by the violation pipeline
//!
//! Flattened view of an `events.k8s.io/v1` watch frame. Every field is a plain
//! string so downstream code never has to deal with absent values.

use serde::Serialize;
use std::collections::BTreeMap;

/// Watch event type as reported by the API server
pub const EVENT_TYPE_ADDED: &str = "ADDED";
pub const EVENT_TYPE_MODIFIED: &str = "MODIFIED";
pub const EVENT_TYPE_DELETED: &str = "DELETED";

/// Resource an event is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

/// One event delivered by the watch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionEvent {
    /// Watch frame type (ADDED, MODIFIED, DELETED, ...)
    pub event_type: String,
    /// Short machine-readable reason, e.g. "DryrunViolation"
    pub reason: String,
    /// Object the event refers to
    pub regarding: ObjectRef,
    /// Free-text description
    pub note: String,
    /// Event object annotations
    pub annotations: BTreeMap<String, String>,
}

impl AdmissionEvent {
    /// Look up an annotation, empty when absent
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map(String::as_str).unwrap_or_default()
    }
}
