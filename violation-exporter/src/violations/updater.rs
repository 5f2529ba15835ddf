//! Metric updates for violation events

use std::sync::Arc;

use tracing::debug;

use crate::kubernetes::types::AdmissionEvent;
use crate::metrics::ViolationRegistry;
use crate::violations::labels::ViolationLabelSet;
use crate::violations::note::ParsedNote;

/// Writes violation observations into the registry
#[derive(Clone)]
pub struct MetricUpdater {
    registry: Arc<ViolationRegistry>,
}

impl MetricUpdater {
    pub fn new(registry: Arc<ViolationRegistry>) -> Self {
        Self { registry }
    }

    /// Set the series identified by this event and note to 1
    pub fn record(&self, event: &AdmissionEvent, note: &ParsedNote) {
        let labels = ViolationLabelSet::from_event(event, note);

        debug!(
            kind = %labels.kind,
            namespace = %labels.namespace,
            name = %labels.name,
            constraint_kind = %labels.constraint_kind,
            constraint_name = %labels.constraint_name,
            "Recording violation"
        );

        self.registry.set_active(&labels);
    }
}
