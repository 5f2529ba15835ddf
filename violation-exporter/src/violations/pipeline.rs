//! Event-to-metric pipeline
//!
//! Consumes events strictly in delivery order. Awaiting the next event is the
//! only suspension point; when the stream ends the pipeline stops for good.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{info, trace, warn};

use crate::kubernetes::types::AdmissionEvent;
use crate::metrics::{EventOutcome, ViolationRegistry};
use crate::state::WatchStatus;
use crate::violations::filter::is_violation_event;
use crate::violations::note::ParsedNote;
use crate::violations::updater::MetricUpdater;

/// Filter, parse and record, one event at a time
pub struct ViolationPipeline {
    registry: Arc<ViolationRegistry>,
    updater: MetricUpdater,
}

impl ViolationPipeline {
    pub fn new(registry: Arc<ViolationRegistry>) -> Self {
        Self {
            updater: MetricUpdater::new(registry.clone()),
            registry,
        }
    }

    /// Handle a single event
    pub fn process(&self, event: &AdmissionEvent) -> EventOutcome {
        let outcome = if is_violation_event(event) {
            let note = ParsedNote::parse(&event.note);
            self.updater.record(event, &note);
            EventOutcome::Recorded
        } else {
            trace!(
                event_type = %event.event_type,
                reason = %event.reason,
                "Ignoring event"
            );
            EventOutcome::Ignored
        };

        self.registry.observe_event(outcome);
        outcome
    }

    /// Drain the stream until it ends
    pub async fn run<S>(&self, events: S, status: &WatchStatus)
    where
        S: Stream<Item = AdmissionEvent>,
    {
        futures::pin_mut!(events);

        status.mark_started();
        info!("Watching for violation events");

        let mut recorded: u64 = 0;
        while let Some(event) = events.next().await {
            if self.process(&event) == EventOutcome::Recorded {
                recorded += 1;
            }
        }

        status.mark_ended();
        warn!(
            recorded,
            "Event stream ended, violation metrics will no longer be updated"
        );
    }
}
