//! Service Health events in raw and canonical form.
//!
//! Raw events arrive either as typed API payloads or as plain JSON mappings.
//! Both shapes implement [`EventSource`] so the canonicalization step reads
//! them through the same accessors.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of an event timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineUpdate {
    /// ISO-8601 timestamp of the update.
    pub time: Option<String>,
    /// Update headline.
    pub title: Option<String>,
    /// Update narrative.
    pub description: Option<String>,
    /// Suggested workaround at the time of the update.
    pub workaround: Option<String>,
}

impl TimelineUpdate {
    /// Ordering key; absent time compares as the empty string.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        self.time.as_deref().unwrap_or_default()
    }
}

/// Canonical health event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthEvent {
    id: Option<String>,
    title: Option<String>,
    state: Option<String>,
    category: Option<String>,
    last_updated: Option<String>,
    impacted_products: Vec<String>,
    timeline: Vec<TimelineUpdate>,
}

impl HealthEvent {
    /// Creates an event, ordering the timeline newest first.
    ///
    /// ISO-8601 strings in one format sort chronologically, so ordering is a
    /// lexicographic comparison. Entries with equal times keep input order.
    #[must_use]
    pub fn new(
        id: Option<String>,
        title: Option<String>,
        state: Option<String>,
        category: Option<String>,
        last_updated: Option<String>,
        impacted_products: Vec<String>,
        mut timeline: Vec<TimelineUpdate>,
    ) -> Self {
        timeline.sort_by(|left, right| right.sort_key().cmp(left.sort_key()));

        Self {
            id,
            title,
            state,
            category,
            last_updated,
            impacted_products,
            timeline,
        }
    }

    /// Event with every field absent, used for input that could not be read.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Returns true when no field carries a value.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self == &Self::default()
    }

    /// Full event resource name.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Event headline.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Event state such as `ACTIVE` or `CLOSED`.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Event category such as `INCIDENT`.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Timestamp of the most recent change.
    #[must_use]
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Names of impacted products.
    #[must_use]
    pub fn impacted_products(&self) -> &[String] {
        self.impacted_products.as_slice()
    }

    /// Timeline ordered newest first.
    #[must_use]
    pub fn timeline(&self) -> &[TimelineUpdate] {
        self.timeline.as_slice()
    }

    /// Workaround of the most recent timeline entry.
    #[must_use]
    pub fn latest_workaround(&self) -> Option<&str> {
        self.timeline
            .first()
            .and_then(|update| update.workaround.as_deref())
    }
}

#[derive(Serialize)]
struct HealthEventView<'a> {
    id: Option<&'a str>,
    title: Option<&'a str>,
    state: Option<&'a str>,
    category: Option<&'a str>,
    last_updated: Option<&'a str>,
    impacted_products: &'a [String],
    timeline: &'a [TimelineUpdate],
    latest_workaround: Option<&'a str>,
}

impl Serialize for HealthEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        HealthEventView {
            id: self.id(),
            title: self.title(),
            state: self.state(),
            category: self.category(),
            last_updated: self.last_updated(),
            impacted_products: self.impacted_products(),
            timeline: self.timeline(),
            latest_workaround: self.latest_workaround(),
        }
        .serialize(serializer)
    }
}

/// Flat event fields readable from any raw event shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    /// Resource name, canonical `id`.
    Name,
    /// Headline.
    Title,
    /// Lifecycle state.
    State,
    /// Category.
    Category,
    /// Last update time, canonical `last_updated`.
    UpdateTime,
}

/// Uniform read access over raw event representations.
pub trait EventSource {
    /// Returns a flat string field, if present.
    fn text(&self, field: EventField) -> Option<String>;

    /// Returns timeline updates in source order.
    fn updates(&self) -> Vec<TimelineUpdate>;

    /// Returns impacted product names in source order, skipping unnamed ones.
    fn impacted_products(&self) -> Vec<String>;
}

/// Product reference inside a typed event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Display name of the product.
    pub product_name: Option<String>,
}

/// Impact entry of a typed event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventImpact {
    /// Impacted product.
    pub product: Option<Product>,
}

/// Update entry of a typed event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventUpdate {
    /// Time of the update.
    pub update_time: Option<String>,
    /// Update headline.
    pub title: Option<String>,
    /// Update narrative.
    pub description: Option<String>,
    /// Symptom summary.
    pub symptom: Option<String>,
    /// Workaround text.
    pub workaround: Option<String>,
}

/// Typed Service Health event as returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceHealthEvent {
    /// Full resource name.
    pub name: Option<String>,
    /// Headline.
    pub title: Option<String>,
    /// Narrative.
    pub description: Option<String>,
    /// Category such as `INCIDENT`.
    pub category: Option<String>,
    /// Lifecycle state.
    pub state: Option<String>,
    /// Last update time.
    pub update_time: Option<String>,
    /// Timeline updates.
    pub updates: Vec<EventUpdate>,
    /// Impacted products.
    pub impacted_products: Vec<Product>,
    /// Impacts, used when `impacted_products` is empty.
    pub event_impacts: Vec<EventImpact>,
}

impl EventSource for ServiceHealthEvent {
    fn text(&self, field: EventField) -> Option<String> {
        match field {
            EventField::Name => self.name.clone(),
            EventField::Title => self.title.clone(),
            EventField::State => self.state.clone(),
            EventField::Category => self.category.clone(),
            EventField::UpdateTime => self.update_time.clone(),
        }
    }

    fn updates(&self) -> Vec<TimelineUpdate> {
        self.updates
            .iter()
            .map(|update| TimelineUpdate {
                time: update.update_time.clone(),
                title: update.title.clone(),
                description: update.description.clone(),
                workaround: update.workaround.clone(),
            })
            .collect()
    }

    fn impacted_products(&self) -> Vec<String> {
        if self.impacted_products.is_empty() {
            return self
                .event_impacts
                .iter()
                .filter_map(|impact| impact.product.as_ref())
                .filter_map(|product| product.product_name.clone())
                .collect();
        }

        self.impacted_products
            .iter()
            .filter_map(|product| product.product_name.clone())
            .collect()
    }
}

/// Keys read for each flat field. Source keys come first, canonical keys
/// after, so a canonical event reads back unchanged.
fn field_keys(field: EventField) -> &'static [&'static str] {
    match field {
        EventField::Name => &["name", "id"],
        EventField::Title => &["title"],
        EventField::State => &["state"],
        EventField::Category => &["category"],
        EventField::UpdateTime => &["updateTime", "last_updated", "lastUpdated"],
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(scalar_text)
}

fn first_array<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

impl EventSource for Map<String, Value> {
    fn text(&self, field: EventField) -> Option<String> {
        first_text(self, field_keys(field))
    }

    fn updates(&self) -> Vec<TimelineUpdate> {
        first_array(self, &["updates", "timeline"])
            .iter()
            .map(|entry| match entry.as_object() {
                Some(update) => TimelineUpdate {
                    time: first_text(update, &["updateTime", "time"]),
                    title: first_text(update, &["title"]),
                    description: first_text(update, &["description"]),
                    workaround: first_text(update, &["workaround"]),
                },
                None => TimelineUpdate::default(),
            })
            .collect()
    }

    fn impacted_products(&self) -> Vec<String> {
        let products = first_array(self, &["impactedProducts", "impacted_products"]);
        if !products.is_empty() {
            return products
                .iter()
                .filter_map(|product| match product {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(fields) => first_text(fields, &["productName"]),
                    _ => None,
                })
                .collect();
        }

        first_array(self, &["eventImpacts"])
            .iter()
            .filter_map(|impact| impact.get("product"))
            .filter_map(|product| product.get("productName"))
            .filter_map(scalar_text)
            .collect()
    }
}

/// Raw event as received from an adapter or a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// Typed API payload.
    Structured(ServiceHealthEvent),
    /// Plain key/value mapping; anything other than a JSON object is malformed.
    Mapping(Value),
}

impl From<ServiceHealthEvent> for RawEvent {
    fn from(value: ServiceHealthEvent) -> Self {
        Self::Structured(value)
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self::Mapping(value)
    }
}
