//! Event note parsing
//!
//! The policy controller packs structured data into the free-text note of
//! its events:
//!
//! ```text
//! (combined from similar events): Admission webhook "validation.gatekeeper.sh" denied request, Resource Namespace: shop, Constraint: must-have-owner, Message: missing owner label
//! ```
//!
//! The leading description is dropped, the remaining `key: value` segments
//! become a [`ParsedNote`]. Only the first three commas separate segments, so
//! the last value may itself contain commas.

use std::fmt;

use tracing::debug;

/// Prefix the event recorder adds when it aggregates repeated events
const COMBINED_FRAMING: &str = "(combined from similar events): ";

/// Description segment plus at most three keyed segments
const MAX_SEGMENTS: usize = 4;

/// Fields extracted from one event note, keyed by normalized field name.
///
/// Fields keep the order they were last written in. Only the final segment of
/// a note may contain commas, so rendering in that order parses back to the
/// same fields.
#[derive(Debug, Clone, Default)]
pub struct ParsedNote {
    fields: Vec<(String, String)>,
}

impl ParsedNote {
    /// Parse a note. Never fails: segments without a `key: value` shape are
    /// skipped.
    pub fn parse(note: &str) -> Self {
        let mut parsed = Self::default();

        for segment in strip_framing(note).splitn(MAX_SEGMENTS, ',').skip(1) {
            let Some((raw_key, raw_value)) = segment.split_once(':') else {
                debug!(segment, "Skipping note segment without a key");
                continue;
            };

            let key = normalize_key(raw_key);
            if key.is_empty() {
                debug!(segment, "Skipping note segment with an empty key");
                continue;
            }

            parsed.insert(key, raw_value.trim_start_matches(' ').to_string());
        }

        parsed
    }

    /// Set a field, moving it to the end when the key already exists
    fn insert(&mut self, key: String, value: String) {
        self.fields.retain(|(existing, _)| *existing != key);
        self.fields.push((key, value));
    }

    /// Value of a field, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `message` field, empty when the note carried none
    pub fn message(&self) -> &str {
        self.get("message").unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Compares as a mapping; field order does not matter
impl PartialEq for ParsedNote {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for ParsedNote {}

/// Renders `key: value, key: value` in field order
impl fmt::Display for ParsedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Remove the aggregation framing as a literal prefix and suffix
fn strip_framing(note: &str) -> &str {
    let note = note.strip_prefix(COMBINED_FRAMING).unwrap_or(note);
    note.strip_suffix(COMBINED_FRAMING).unwrap_or(note)
}

/// Lowercase, drop leading spaces, turn remaining spaces into hyphens
fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().trim_start_matches(' ').replace(' ', "-")
}
