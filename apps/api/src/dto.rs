use assetlens_application::AssetSearchInput;
use assetlens_domain::{AuditResult, ResourceRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for `search_assets`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchAssetsRequest {
    pub query: String,
    pub scope: Option<String>,
    pub asset_types: Option<Vec<String>>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub token: Option<String>,
}

impl SearchAssetsRequest {
    pub fn into_parts(self) -> (AssetSearchInput, Option<String>) {
        (
            AssetSearchInput {
                query: self.query,
                scope: self.scope,
                asset_types: self.asset_types,
                page_size: self.page_size,
                page_token: self.page_token,
            },
            self.token,
        )
    }
}

/// Incoming payload for `search_resources`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResourcesRequest {
    pub query: Option<String>,
    pub scope: String,
    pub location: Option<String>,
    pub token: Option<String>,
}

/// Incoming payload for `list_projects_without_service_health`.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceHealthAuditRequest {
    pub scope: String,
    pub max_projects: Option<u32>,
    pub token: Option<String>,
}

/// Incoming payload for `list_active_events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListActiveEventsRequest {
    pub project_id: String,
    pub location: Option<String>,
    pub token: Option<String>,
}

/// Incoming payload for `list_org_events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrgEventsRequest {
    pub organization_id: String,
    pub token: Option<String>,
}

/// Incoming payload for `get_event_details`.
#[derive(Debug, Default, Deserialize)]
pub struct GetEventDetailsRequest {
    pub event_name: String,
    pub token: Option<String>,
}

/// Incoming payload for `normalize_event`.
#[derive(Debug, Default, Deserialize)]
pub struct NormalizeEventRequest {
    #[serde(default)]
    pub event: Value,
}

/// API representation of one asset.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssetResponse {
    pub name: String,
    pub asset_type: String,
    pub display_name: Option<String>,
    pub project: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
}

impl From<ResourceRecord> for AssetResponse {
    fn from(value: ResourceRecord) -> Self {
        Self {
            name: value.name,
            asset_type: value.asset_type,
            display_name: value.display_name,
            project: value.project,
            location: value.location,
            state: value.state,
        }
    }
}

/// One page of `search_assets` results.
#[derive(Debug, Serialize)]
pub struct SearchAssetsResponse {
    pub resources: Vec<AssetResponse>,
    pub next_page_token: Option<String>,
    /// Set when the backend returned more records than requested.
    pub truncated: bool,
}

/// Active resources returned by `search_resources`.
#[derive(Debug, Serialize)]
pub struct SearchResourcesResponse {
    pub resources: Vec<AssetResponse>,
}

/// Result of `list_projects_without_service_health`.
#[derive(Debug, Serialize)]
pub struct ServiceHealthAuditResponse {
    pub disabled_projects: Vec<String>,
    pub scanned_count: usize,
    pub truncated: bool,
    pub warning: Option<String>,
}

impl From<AuditResult> for ServiceHealthAuditResponse {
    fn from(value: AuditResult) -> Self {
        let warning = value.warning();
        Self {
            disabled_projects: value.flagged,
            scanned_count: value.scanned_count,
            truncated: value.truncated,
            warning,
        }
    }
}
