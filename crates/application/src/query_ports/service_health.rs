use assetlens_core::{AppResult, Credential};
use assetlens_domain::RawEvent;
use async_trait::async_trait;

/// Which event collection a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFeed {
    /// `projects/<id>/locations/<location>/events`.
    Project,
    /// `organizations/<id>/locations/<location>/organizationEvents`.
    Organization,
}

impl EventFeed {
    /// Picks the feed an event resource name belongs to.
    #[must_use]
    pub fn for_event_name(name: &str) -> Self {
        if name.contains("organizationEvents") {
            Self::Organization
        } else {
            Self::Project
        }
    }
}

/// One page fetch of health events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListRequest {
    /// Parent location, for example `projects/p/locations/global`.
    pub parent: String,
    /// Event collection under the parent.
    pub feed: EventFeed,
    /// Filter expression such as `state = ACTIVE`.
    pub filter: String,
    /// Maximum events for this page.
    pub page_size: u32,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
}

/// One page of raw health events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    /// Raw events in service order.
    pub events: Vec<RawEvent>,
    /// Continuation token, absent on the final page.
    pub next_page_token: Option<String>,
}

/// Port for Service Health reads.
#[async_trait]
pub trait ServiceHealthSource: Send + Sync {
    /// Fetches one page of events.
    async fn list_events(
        &self,
        credential: &Credential,
        request: EventListRequest,
    ) -> AppResult<EventPage>;

    /// Fetches one event by full resource name.
    async fn get_event(
        &self,
        credential: &Credential,
        feed: EventFeed,
        name: &str,
    ) -> AppResult<RawEvent>;
}
