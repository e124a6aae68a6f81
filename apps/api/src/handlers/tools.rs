use assetlens_application::ResourceSearchInput;
use assetlens_domain::{HealthEvent, RawEvent};
use axum::Json;
use axum::extract::State;

use crate::dto::{
    AssetResponse, GetEventDetailsRequest, ListActiveEventsRequest, ListOrgEventsRequest,
    NormalizeEventRequest, SearchAssetsRequest, SearchAssetsResponse, SearchResourcesRequest,
    SearchResourcesResponse, ServiceHealthAuditRequest, ServiceHealthAuditResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn search_assets_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchAssetsRequest>,
) -> ApiResult<Json<SearchAssetsResponse>> {
    let (input, token) = payload.into_parts();
    let page = state
        .inventory_service
        .search_assets(input, token.as_deref())
        .await?;
    let truncated = page.is_clipped();
    let (records, next_page_token) = page.into_parts();

    Ok(Json(SearchAssetsResponse {
        resources: records.into_iter().map(AssetResponse::from).collect(),
        next_page_token,
        truncated,
    }))
}

pub async fn search_resources_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchResourcesRequest>,
) -> ApiResult<Json<SearchResourcesResponse>> {
    let records = state
        .inventory_service
        .search_resources(
            ResourceSearchInput {
                query: payload.query,
                scope: payload.scope,
                location: payload.location,
            },
            payload.token.as_deref(),
        )
        .await?;

    Ok(Json(SearchResourcesResponse {
        resources: records.into_iter().map(AssetResponse::from).collect(),
    }))
}

pub async fn list_projects_without_service_health_handler(
    State(state): State<AppState>,
    Json(payload): Json<ServiceHealthAuditRequest>,
) -> ApiResult<Json<ServiceHealthAuditResponse>> {
    let result = state
        .inventory_service
        .list_projects_without_service_health(
            &payload.scope,
            payload.max_projects,
            payload.token.as_deref(),
        )
        .await?;

    Ok(Json(ServiceHealthAuditResponse::from(result)))
}

pub async fn list_active_events_handler(
    State(state): State<AppState>,
    Json(payload): Json<ListActiveEventsRequest>,
) -> ApiResult<Json<Vec<HealthEvent>>> {
    let events = state
        .health_event_service
        .list_active_events(
            &payload.project_id,
            payload.location.as_deref(),
            payload.token.as_deref(),
        )
        .await?;

    Ok(Json(events))
}

pub async fn list_org_events_handler(
    State(state): State<AppState>,
    Json(payload): Json<ListOrgEventsRequest>,
) -> ApiResult<Json<Vec<HealthEvent>>> {
    let events = state
        .health_event_service
        .list_org_events(&payload.organization_id, payload.token.as_deref())
        .await?;

    Ok(Json(events))
}

pub async fn get_event_details_handler(
    State(state): State<AppState>,
    Json(payload): Json<GetEventDetailsRequest>,
) -> ApiResult<Json<HealthEvent>> {
    let event = state
        .health_event_service
        .get_event_details(&payload.event_name, payload.token.as_deref())
        .await?;

    Ok(Json(event))
}

pub async fn normalize_event_handler(
    State(state): State<AppState>,
    Json(payload): Json<NormalizeEventRequest>,
) -> Json<HealthEvent> {
    Json(
        state
            .health_event_service
            .normalize(&RawEvent::Mapping(payload.event)),
    )
}
