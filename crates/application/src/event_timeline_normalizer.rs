//! Canonical form of Service Health events.
//!
//! Typed and raw-mapping events normalize to the same [`HealthEvent`], with
//! the timeline newest first and the latest workaround taken from it.

use tracing::warn;

use assetlens_domain::{EventField, EventSource, HealthEvent, RawEvent};

/// Converts a raw event of either shape into a canonical [`HealthEvent`].
///
/// A mapping that is not a JSON object yields an all-absent event.
#[must_use]
pub fn normalize_event(raw: &RawEvent) -> HealthEvent {
    match raw {
        RawEvent::Structured(event) => from_source(event),
        RawEvent::Mapping(value) => match value.as_object() {
            Some(fields) => from_source(fields),
            None => {
                warn!(
                    kind = json_kind(value),
                    "malformed health event record ignored"
                );
                HealthEvent::absent()
            }
        },
    }
}

fn from_source(source: &dyn EventSource) -> HealthEvent {
    HealthEvent::new(
        source.text(EventField::Name),
        source.text(EventField::Title),
        source.text(EventField::State),
        source.text(EventField::Category),
        source.text(EventField::UpdateTime),
        source.impacted_products(),
        source.updates(),
    )
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
