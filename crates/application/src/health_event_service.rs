use std::sync::Arc;

use tracing::debug;

use assetlens_core::{AppError, AppResult, Credential, NonEmptyString};
use assetlens_domain::{HealthEvent, ProjectId, RawEvent};

use crate::authenticator::{Authenticator, resolve_credential};
use crate::event_timeline_normalizer::normalize_event;
use crate::query_ports::{EventFeed, EventListRequest, ServiceHealthSource};

/// Filter selecting ongoing events.
pub const ACTIVE_EVENT_FILTER: &str = "state = ACTIVE";

/// Location used when the caller names none.
pub const DEFAULT_EVENT_LOCATION: &str = "global";

const MAX_EVENT_PAGES: u32 = 5;

/// Service Health use cases returning canonical events.
#[derive(Clone)]
pub struct HealthEventService {
    authenticator: Arc<dyn Authenticator>,
    source: Arc<dyn ServiceHealthSource>,
    list_limit: usize,
}

impl HealthEventService {
    /// Creates the service; list operations return at most `list_limit` events.
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        source: Arc<dyn ServiceHealthSource>,
        list_limit: usize,
    ) -> Self {
        Self {
            authenticator,
            source,
            list_limit: list_limit.max(1),
        }
    }

    /// Lists active events of one project.
    pub async fn list_active_events(
        &self,
        project_id: &str,
        location: Option<&str>,
        explicit_token: Option<&str>,
    ) -> AppResult<Vec<HealthEvent>> {
        let project_id = ProjectId::new(project_id)?;
        let location = event_location(location)?;

        let credential = self.credential(explicit_token).await?;
        self.collect_active(
            &credential,
            format!("projects/{}/locations/{location}", project_id.as_str()),
            EventFeed::Project,
        )
        .await
    }

    /// Lists active events across an organization.
    ///
    /// Accepts either the numeric id or `organizations/<id>`.
    pub async fn list_org_events(
        &self,
        organization_id: &str,
        explicit_token: Option<&str>,
    ) -> AppResult<Vec<HealthEvent>> {
        let organization_id = organization_id.trim();
        let organization_id = organization_id
            .strip_prefix("organizations/")
            .unwrap_or(organization_id);
        if organization_id.is_empty() || !organization_id.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(AppError::InvalidInput(format!(
                "invalid organization_id '{organization_id}', expected digits"
            )));
        }

        let credential = self.credential(explicit_token).await?;
        self.collect_active(
            &credential,
            format!("organizations/{organization_id}/locations/{DEFAULT_EVENT_LOCATION}"),
            EventFeed::Organization,
        )
        .await
    }

    /// Fetches and normalizes one event by full resource name.
    pub async fn get_event_details(
        &self,
        event_name: &str,
        explicit_token: Option<&str>,
    ) -> AppResult<HealthEvent> {
        let event_name = NonEmptyString::new(event_name.trim())?;
        let feed = EventFeed::for_event_name(event_name.as_str());

        let credential = self.credential(explicit_token).await?;
        let raw = self
            .source
            .get_event(&credential, feed, event_name.as_str())
            .await?;

        Ok(normalize_event(&raw))
    }

    /// Normalizes a caller-supplied raw event.
    #[must_use]
    pub fn normalize(&self, raw: &RawEvent) -> HealthEvent {
        normalize_event(raw)
    }

    async fn collect_active(
        &self,
        credential: &Credential,
        parent: String,
        feed: EventFeed,
    ) -> AppResult<Vec<HealthEvent>> {
        let mut events = Vec::new();
        let mut page_token = None;

        for _ in 0..MAX_EVENT_PAGES {
            let remaining = self.list_limit.saturating_sub(events.len());
            let page = self
                .source
                .list_events(
                    credential,
                    EventListRequest {
                        parent: parent.clone(),
                        feed,
                        filter: ACTIVE_EVENT_FILTER.to_owned(),
                        page_size: u32::try_from(remaining).unwrap_or(u32::MAX),
                        page_token: page_token.take(),
                    },
                )
                .await?;

            events.extend(page.events.iter().take(remaining).map(normalize_event));
            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if events.len() >= self.list_limit || page_token.is_none() {
                break;
            }
        }

        debug!(parent = %parent, events = events.len(), "health events listed");
        Ok(events)
    }

    async fn credential(&self, explicit_token: Option<&str>) -> AppResult<Credential> {
        resolve_credential(self.authenticator.as_ref(), explicit_token).await
    }
}

/// Validates an event location such as `global` or `us-central1`.
fn event_location(location: Option<&str>) -> AppResult<&str> {
    let location = location
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .unwrap_or(DEFAULT_EVENT_LOCATION);
    let is_valid = location.chars().all(|character| {
        character.is_ascii_lowercase() || character.is_ascii_digit() || character == '-'
    }) && location.chars().any(|character| character != '-');

    if !is_valid {
        return Err(AppError::InvalidInput(format!(
            "invalid location '{location}': must be lowercase alphanumeric with hyphens"
        )));
    }

    Ok(location)
}

#[cfg(test)]
mod tests;
