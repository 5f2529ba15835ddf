//! Event relevance filter

use crate::kubernetes::types::AdmissionEvent;

/// Watch event types that can report a violation. Deletions never retract one.
const ACCEPTED_TYPES: [&str; 2] = ["added", "modified"];

/// Reasons the policy controller uses for audit-mode and enforced denials
pub const REASON_DRYRUN_VIOLATION: &str = "DryrunViolation";
pub const REASON_FAILED_ADMISSION: &str = "FailedAdmission";

/// Whether an event describes a policy violation worth recording.
///
/// Type comparison ignores case; the reason must match exactly.
pub fn is_violation_event(event: &AdmissionEvent) -> bool {
    let type_accepted = ACCEPTED_TYPES
        .iter()
        .any(|accepted| event.event_type.eq_ignore_ascii_case(accepted));

    type_accepted
        && matches!(
            event.reason.as_str(),
            REASON_DRYRUN_VIOLATION | REASON_FAILED_ADMISSION
        )
}
