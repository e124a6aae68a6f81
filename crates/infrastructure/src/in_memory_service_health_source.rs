use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use assetlens_application::{EventFeed, EventListRequest, EventPage, ServiceHealthSource};
use assetlens_core::{AppError, AppResult, Credential};
use assetlens_domain::{EventField, EventSource, RawEvent};

/// In-memory Service Health events keyed by parent location and feed.
#[derive(Debug, Default)]
pub struct InMemoryServiceHealthSource {
    events: RwLock<HashMap<(String, EventFeed), Vec<RawEvent>>>,
}

impl InMemoryServiceHealthSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes an event under `parent`.
    pub async fn publish(&self, parent: &str, feed: EventFeed, event: RawEvent) {
        self.events
            .write()
            .await
            .entry((parent.to_owned(), feed))
            .or_default()
            .push(event);
    }
}

fn text(event: &RawEvent, field: EventField) -> Option<String> {
    match event {
        RawEvent::Structured(event) => event.text(field),
        RawEvent::Mapping(value) => value.as_object().and_then(|fields| fields.text(field)),
    }
}

/// Parses `state = VALUE`; an empty filter selects every event.
fn state_filter(filter: &str) -> AppResult<Option<String>> {
    let filter = filter.trim();
    if filter.is_empty() {
        return Ok(None);
    }

    match filter.split_once('=') {
        Some((field, value)) if field.trim() == "state" && !value.trim().is_empty() => {
            Ok(Some(value.trim().to_owned()))
        }
        _ => Err(AppError::InvalidInput(format!(
            "unsupported event filter '{filter}'"
        ))),
    }
}

#[async_trait]
impl ServiceHealthSource for InMemoryServiceHealthSource {
    async fn list_events(
        &self,
        _credential: &Credential,
        request: EventListRequest,
    ) -> AppResult<EventPage> {
        let state = state_filter(&request.filter)?;
        let offset = match request.page_token.as_deref() {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                AppError::InvalidInput(format!("invalid page token '{token}'"))
            })?,
        };

        let events = self.events.read().await;
        let matching: Vec<&RawEvent> = events
            .get(&(request.parent.clone(), request.feed))
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|event| {
                state
                    .as_deref()
                    .is_none_or(|state| text(event, EventField::State).as_deref() == Some(state))
            })
            .collect();

        let page_size = usize::try_from(request.page_size.max(1)).unwrap_or(1);
        let page: Vec<RawEvent> = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|event| RawEvent::clone(event))
            .collect();
        let next_offset = offset.saturating_add(page.len());

        Ok(EventPage {
            events: page,
            next_page_token: (next_offset < matching.len()).then(|| next_offset.to_string()),
        })
    }

    async fn get_event(
        &self,
        _credential: &Credential,
        feed: EventFeed,
        name: &str,
    ) -> AppResult<RawEvent> {
        let events = self.events.read().await;

        events
            .iter()
            .filter(|((_, stored_feed), _)| *stored_feed == feed)
            .flat_map(|(_, events)| events.iter())
            .find(|event| text(event, EventField::Name).as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("event '{name}' does not exist")))
    }
}
