use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use assetlens_core::{AppError, AppResult, Credential};
use assetlens_domain::RawEvent;

use super::{ACTIVE_EVENT_FILTER, HealthEventService};
use crate::authenticator::BearerAuthenticator;
use crate::query_ports::{EventFeed, EventListRequest, EventPage, ServiceHealthSource};

#[derive(Default)]
struct FakeServiceHealthSource {
    pages: HashMap<String, Vec<EventPage>>,
    events: HashMap<String, RawEvent>,
    list_requests: Mutex<Vec<EventListRequest>>,
    get_requests: Mutex<Vec<(EventFeed, String)>>,
}

#[async_trait]
impl ServiceHealthSource for FakeServiceHealthSource {
    async fn list_events(
        &self,
        _credential: &Credential,
        request: EventListRequest,
    ) -> AppResult<EventPage> {
        let index = request
            .page_token
            .as_deref()
            .and_then(|token| token.parse::<usize>().ok())
            .unwrap_or(0);
        let page = self
            .pages
            .get(&request.parent)
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default();
        self.list_requests.lock().await.push(request);
        Ok(page)
    }

    async fn get_event(
        &self,
        _credential: &Credential,
        feed: EventFeed,
        name: &str,
    ) -> AppResult<RawEvent> {
        self.get_requests.lock().await.push((feed, name.to_owned()));
        self.events
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("event '{name}' does not exist")))
    }
}

fn event(index: usize) -> RawEvent {
    RawEvent::Mapping(json!({
        "name": format!("projects/demo/locations/global/events/e{index}"),
        "title": format!("Event {index}"),
        "state": "ACTIVE",
        "updates": [{"updateTime": "2024-01-01T00:00:00Z", "workaround": format!("w{index}")}]
    }))
}

fn page(range: std::ops::Range<usize>, next_page_token: Option<&str>) -> EventPage {
    EventPage {
        events: range.map(event).collect(),
        next_page_token: next_page_token.map(str::to_owned),
    }
}

fn service(source: &Arc<FakeServiceHealthSource>, limit: usize) -> HealthEventService {
    HealthEventService::new(Arc::new(BearerAuthenticator::new()), source.clone(), limit)
}

#[tokio::test]
async fn active_events_follow_pages_until_limit() {
    let mut pages = HashMap::new();
    pages.insert(
        "projects/demo/locations/global".to_owned(),
        vec![page(0..4, Some("1")), page(4..8, Some("2")), page(8..12, None)],
    );
    let source = Arc::new(FakeServiceHealthSource {
        pages,
        ..FakeServiceHealthSource::default()
    });

    let events = service(&source, 6)
        .list_active_events("demo", None, Some("token"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(events.len(), 6);
    assert_eq!(events[5].title(), Some("Event 5"));

    let requests = source.list_requests.lock().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].filter, ACTIVE_EVENT_FILTER);
    assert_eq!(requests[0].feed, EventFeed::Project);
    assert_eq!(requests[0].page_size, 6);
    assert_eq!(requests[1].page_size, 2);
}

#[tokio::test]
async fn active_events_stop_at_last_page() {
    let mut pages = HashMap::new();
    pages.insert(
        "projects/demo/locations/us-central1".to_owned(),
        vec![page(0..2, None)],
    );
    let source = Arc::new(FakeServiceHealthSource {
        pages,
        ..FakeServiceHealthSource::default()
    });

    let events = service(&source, 10)
        .list_active_events("demo", Some("us-central1"), Some("token"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(events.len(), 2);
    assert_eq!(source.list_requests.lock().await.len(), 1);
}

#[tokio::test]
async fn invalid_project_id_is_rejected_before_authenticating() {
    let source = Arc::new(FakeServiceHealthSource::default());

    let result = service(&source, 10)
        .list_active_events("Bad_Project!", None, None)
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert!(source.list_requests.lock().await.is_empty());
}

#[tokio::test]
async fn malformed_locations_are_rejected_before_authenticating() {
    let source = Arc::new(FakeServiceHealthSource::default());
    let service = service(&source, 10);

    for location in ["..", "global?x=1", "us#east", "a/b", "Global", "--"] {
        let result = service
            .list_active_events("demo", Some(location), Some("token"))
            .await;
        assert!(
            matches!(result, Err(AppError::InvalidInput(_))),
            "location {location:?} should be rejected"
        );
    }
    assert!(source.list_requests.lock().await.is_empty());
}

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let source = Arc::new(FakeServiceHealthSource::default());

    let result = service(&source, 10)
        .list_active_events("demo", None, None)
        .await;

    assert!(matches!(result, Err(AppError::Unauthenticated(_))));
}

#[tokio::test]
async fn organization_events_use_organization_feed() {
    let mut pages = HashMap::new();
    pages.insert(
        "organizations/42/locations/global".to_owned(),
        vec![page(0..1, None)],
    );
    let source = Arc::new(FakeServiceHealthSource {
        pages,
        ..FakeServiceHealthSource::default()
    });
    let health = service(&source, 10);

    let plain = health.list_org_events("42", Some("token")).await;
    let prefixed = health
        .list_org_events("organizations/42", Some("token"))
        .await;

    assert_eq!(plain.map(|events| events.len()).ok(), Some(1));
    assert_eq!(prefixed.map(|events| events.len()).ok(), Some(1));
    let requests = source.list_requests.lock().await;
    assert!(
        requests
            .iter()
            .all(|request| request.feed == EventFeed::Organization)
    );
}

#[tokio::test]
async fn non_numeric_organization_id_is_rejected() {
    let source = Arc::new(FakeServiceHealthSource::default());

    let result = service(&source, 10)
        .list_org_events("acme", Some("token"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn event_details_pick_feed_from_name() {
    let org_name = "organizations/42/locations/global/organizationEvents/x";
    let project_name = "projects/demo/locations/global/events/e1";
    let mut events = HashMap::new();
    events.insert(
        org_name.to_owned(),
        RawEvent::Mapping(json!({"name": org_name, "title": "Org outage"})),
    );
    events.insert(project_name.to_owned(), event(1));
    let source = Arc::new(FakeServiceHealthSource {
        events,
        ..FakeServiceHealthSource::default()
    });
    let health = service(&source, 10);

    let org_event = health
        .get_event_details(org_name, Some("token"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let project_event = health
        .get_event_details(project_name, Some("token"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(org_event.title(), Some("Org outage"));
    assert_eq!(project_event.latest_workaround(), Some("w1"));
    let requests = source.get_requests.lock().await;
    assert_eq!(requests[0].0, EventFeed::Organization);
    assert_eq!(requests[1].0, EventFeed::Project);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let source = Arc::new(FakeServiceHealthSource::default());

    let result = service(&source, 10)
        .get_event_details("projects/demo/locations/global/events/none", Some("token"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn normalize_does_not_need_credentials() {
    let source = Arc::new(FakeServiceHealthSource::default());

    let event = service(&source, 10).normalize(&event(3));

    assert_eq!(event.id(), Some("projects/demo/locations/global/events/e3"));
    assert_eq!(event.latest_workaround(), Some("w3"));
}
