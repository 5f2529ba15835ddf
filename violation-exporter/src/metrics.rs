//! Violation metric registry
//!
//! Owns a private `prometheus::Registry` holding the `violation` gauge vector.
//! The pipeline task is the only writer; the scrape handler only gathers.
//! Series are never removed, so the registry grows with every new label set
//! until the process restarts.

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::ExporterResult;
use crate::violations::labels::{ViolationLabelSet, VIOLATION_LABELS};

/// Name of the exported violation gauge
pub const VIOLATION_METRIC: &str = "violation";

const VIOLATION_HELP: &str = "Violations events from opa-gatekeeper";

/// What happened to one event taken off the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Passed the filter and set a violation series
    Recorded,
    /// Rejected by the filter
    Ignored,
}

impl AsRef<str> for EventOutcome {
    fn as_ref(&self) -> &str {
        match self {
            EventOutcome::Recorded => "recorded",
            EventOutcome::Ignored => "ignored",
        }
    }
}

/// Process-wide metric state, shared behind an `Arc`
pub struct ViolationRegistry {
    registry: Registry,
    violations: GaugeVec,
    events_total: IntCounterVec,
}

impl ViolationRegistry {
    /// Create a registry with the violation gauge and the event counter
    /// registered
    pub fn new() -> ExporterResult<Self> {
        let registry = Registry::new();

        let violations = GaugeVec::new(
            Opts::new(VIOLATION_METRIC, VIOLATION_HELP),
            &VIOLATION_LABELS,
        )?;
        registry.register(Box::new(violations.clone()))?;

        let events_total = IntCounterVec::new(
            Opts::new(
                "violation_exporter_events_total",
                "Events read from the watch grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        Ok(Self {
            registry,
            violations,
            events_total,
        })
    }

    /// Mark the series for this label set as active. Repeated calls with an
    /// equal label set leave a single series at 1.
    pub fn set_active(&self, labels: &ViolationLabelSet) {
        self.violations
            .with_label_values(&labels.as_values())
            .set(1.0);
    }

    /// Count one event taken off the stream
    pub fn observe_event(&self, outcome: EventOutcome) {
        self.events_total
            .with_label_values(&[outcome.as_ref()])
            .inc();
    }

    /// Number of distinct violation series
    pub fn violation_series(&self) -> usize {
        self.gather()
            .iter()
            .find(|family| family.get_name() == VIOLATION_METRIC)
            .map(|family| family.get_metric().len())
            .unwrap_or(0)
    }

    /// Snapshot every metric family
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode the current state in the Prometheus text exposition format
    pub fn export(&self) -> ExporterResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Content type of [`export`](Self::export) output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
