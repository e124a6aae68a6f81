use std::sync::Arc;

use assetlens_application::{
    Authenticator, BearerAuthenticator, EnablementAuditor, HealthEventService, InventoryService,
    PaginatedScanner, ResourceQueryService, ServiceHealthSource,
};
use assetlens_core::AppError;
use assetlens_domain::Scope;
use assetlens_infrastructure::{
    HttpCloudAssetQueryService, HttpServiceHealthSource, InMemoryResourceQueryService,
    InMemoryServiceHealthSource,
};
use tracing::info;

use crate::api_config::{ApiConfig, QueryBackend};
use crate::dev_seed;
use crate::state::AppState;

struct QueryBackends {
    resources: Arc<dyn ResourceQueryService>,
    events: Arc<dyn ServiceHealthSource>,
}

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let backends = match config.query_backend {
        QueryBackend::Google => build_google_backends(config)?,
        QueryBackend::Memory => build_memory_backends().await,
    };
    info!(backend = ?config.query_backend, "query backend selected");

    compose_state(config, backends.resources, backends.events)
}

/// Wires application services over the given ports.
pub fn compose_state(
    config: &ApiConfig,
    resources: Arc<dyn ResourceQueryService>,
    events: Arc<dyn ServiceHealthSource>,
) -> Result<AppState, AppError> {
    let authenticator: Arc<dyn Authenticator> = Arc::new(BearerAuthenticator::new());
    let scanner = PaginatedScanner::new(resources);
    let auditor = EnablementAuditor::new(scanner.clone(), config.audit_policy);

    Ok(AppState {
        inventory_service: InventoryService::new(
            authenticator.clone(),
            scanner,
            auditor,
            Scope::new(config.default_scope.as_str())?,
        ),
        health_event_service: HealthEventService::new(
            authenticator,
            events,
            config.event_list_limit,
        ),
    })
}

fn build_google_backends(config: &ApiConfig) -> Result<QueryBackends, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(QueryBackends {
        resources: Arc::new(HttpCloudAssetQueryService::new(
            http_client.clone(),
            &config.cloud_asset_endpoint,
        )?),
        events: Arc::new(HttpServiceHealthSource::new(
            http_client,
            &config.service_health_endpoint,
        )?),
    })
}

async fn build_memory_backends() -> QueryBackends {
    let resources = Arc::new(InMemoryResourceQueryService::new());
    let events = Arc::new(InMemoryServiceHealthSource::new());
    dev_seed::run(&resources, &events).await;

    QueryBackends { resources, events }
}
