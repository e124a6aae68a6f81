use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use assetlens_application::{EventFeed, EventListRequest, EventPage, ServiceHealthSource};
use assetlens_core::{AppResult, Credential};
use assetlens_domain::{RawEvent, ServiceHealthEvent};

use crate::google_api::{get_json, parse_endpoint, resource_url};

/// Service Health API client for project and organization events.
pub struct HttpServiceHealthSource {
    http_client: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListEventsResponse {
    events: Vec<Value>,
    organization_events: Vec<Value>,
    next_page_token: Option<String>,
}

impl HttpServiceHealthSource {
    /// Creates a client for the API base `endpoint`.
    pub fn new(http_client: reqwest::Client, endpoint: &str) -> AppResult<Self> {
        Ok(Self {
            http_client,
            endpoint: parse_endpoint(endpoint)?,
        })
    }
}

fn collection(feed: EventFeed) -> &'static str {
    match feed {
        EventFeed::Project => "events",
        EventFeed::Organization => "organizationEvents",
    }
}

/// Typed decoding first; payloads the typed shape rejects stay raw mappings.
fn raw_event(value: Value) -> RawEvent {
    match serde_json::from_value::<ServiceHealthEvent>(value.clone()) {
        Ok(event) => RawEvent::Structured(event),
        Err(_) => RawEvent::Mapping(value),
    }
}

#[async_trait]
impl ServiceHealthSource for HttpServiceHealthSource {
    async fn list_events(
        &self,
        credential: &Credential,
        request: EventListRequest,
    ) -> AppResult<EventPage> {
        let mut url = resource_url(
            &self.endpoint,
            &format!("{}/{}", request.parent, collection(request.feed)),
        )?;
        {
            let mut query = url.query_pairs_mut();
            if !request.filter.is_empty() {
                query.append_pair("filter", request.filter.as_str());
            }
            query.append_pair("pageSize", &request.page_size.to_string());
            if let Some(page_token) = request.page_token.as_deref() {
                query.append_pair("pageToken", page_token);
            }
        }

        let response: ListEventsResponse = get_json(&self.http_client, credential, url).await?;
        let events: Vec<RawEvent> = response
            .events
            .into_iter()
            .chain(response.organization_events)
            .map(raw_event)
            .collect();

        debug!(
            parent = %request.parent,
            events = events.len(),
            "service health page received"
        );

        Ok(EventPage {
            events,
            next_page_token: response.next_page_token.filter(|token| !token.is_empty()),
        })
    }

    async fn get_event(
        &self,
        credential: &Credential,
        _feed: EventFeed,
        name: &str,
    ) -> AppResult<RawEvent> {
        let url = resource_url(&self.endpoint, name)?;
        let value: Value = get_json(&self.http_client, credential, url).await?;

        Ok(raw_event(value))
    }
}
