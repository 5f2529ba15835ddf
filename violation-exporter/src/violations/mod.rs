//! Violation extraction
//!
//! Turns policy controller events into `violation` gauge series:
//! [`filter`] picks relevant events, [`note`] parses their note text,
//! [`updater`] records the resulting [`labels::ViolationLabelSet`], and
//! [`pipeline`] strings the three together over an event stream.

pub mod filter;
pub mod labels;
pub mod note;
pub mod pipeline;
pub mod updater;

pub use labels::ViolationLabelSet;
pub use note::ParsedNote;
pub use pipeline::ViolationPipeline;
pub use updater::MetricUpdater;
