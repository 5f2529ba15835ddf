//! Violation label set

use serde::Serialize;

use crate::kubernetes::types::AdmissionEvent;
use crate::violations::note::ParsedNote;

/// Label names of the `violation` gauge, in value order
pub const VIOLATION_LABELS: [&str; 6] = [
    "kind",
    "namespace",
    "name",
    "message",
    "constraint_kind",
    "constraint_name",
];

const CONSTRAINT_KIND_ANNOTATION: &str = "constraint_kind";
const CONSTRAINT_NAME_ANNOTATION: &str = "constraint_name";

/// Identity of one violation series. Every field is always present; missing
/// source data shows up as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ViolationLabelSet {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub message: String,
    pub constraint_kind: String,
    pub constraint_name: String,
}

impl ViolationLabelSet {
    /// Combine the event's subject and annotations with the parsed note
    pub fn from_event(event: &AdmissionEvent, note: &ParsedNote) -> Self {
        Self {
            kind: event.regarding.kind.clone(),
            namespace: event.regarding.namespace.clone(),
            name: event.regarding.name.clone(),
            message: note.message().to_string(),
            constraint_kind: event.annotation(CONSTRAINT_KIND_ANNOTATION).to_string(),
            constraint_name: event.annotation(CONSTRAINT_NAME_ANNOTATION).to_string(),
        }
    }

    /// Values in [`VIOLATION_LABELS`] order
    pub fn as_values(&self) -> [&str; 6] {
        [
            self.kind.as_str(),
            self.namespace.as_str(),
            self.name.as_str(),
            self.message.as_str(),
            self.constraint_kind.as_str(),
            self.constraint_name.as_str(),
        ]
    }
}
