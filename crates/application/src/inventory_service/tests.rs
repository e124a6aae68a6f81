use std::sync::Arc;

use assetlens_core::{AppError, BearerToken};
use assetlens_domain::{ResourceKind, ResourceRecord, Scope};

use super::{AssetSearchInput, InventoryService, ResourceSearchInput, SERVICE_HEALTH_API};
use crate::authenticator::{BearerAuthenticator, with_ambient_token};
use crate::enablement_auditor::{AuditPolicy, EnablementAuditor};
use crate::paginated_scanner::PaginatedScanner;
use crate::test_support::{StreamQueryService, enabled_service, project};

const MARKERS: &str = "name:servicehealth.googleapis.com";

fn service(query_service: &Arc<StreamQueryService>) -> InventoryService {
    service_with_policy(query_service, AuditPolicy::default())
}

fn service_with_policy(
    query_service: &Arc<StreamQueryService>,
    policy: AuditPolicy,
) -> InventoryService {
    let scanner = PaginatedScanner::new(query_service.clone());
    InventoryService::new(
        Arc::new(BearerAuthenticator::new()),
        scanner.clone(),
        EnablementAuditor::new(scanner, policy),
        Scope::new("organizations/123456789").unwrap_or_else(|_| unreachable!()),
    )
}

fn instance(index: u32) -> ResourceRecord {
    ResourceRecord::new(
        format!("//compute.googleapis.com/projects/demo/zones/us-central1-a/instances/vm-{index}"),
        ResourceKind::COMPUTE_INSTANCE_ASSET_TYPE,
    )
    .with_project("projects/42")
}

#[tokio::test]
async fn search_assets_fetches_one_page_with_defaults() {
    let query_service = Arc::new(
        StreamQueryService::new().with_stream("name:vm", (1..=70).map(instance).collect()),
    );

    let page = service(&query_service)
        .search_assets(
            AssetSearchInput {
                query: "name:vm".to_owned(),
                ..AssetSearchInput::default()
            },
            Some("token"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.records().len(), 50);
    assert_eq!(page.next_page_token(), Some("50"));

    let requests = query_service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].scope, "organizations/123456789");
    assert_eq!(
        requests[0].asset_types,
        vec![ResourceKind::COMPUTE_INSTANCE_ASSET_TYPE.to_owned()]
    );
    assert_eq!(requests[0].page_size, 50);
}

#[tokio::test]
async fn search_assets_caps_page_size_and_forwards_token() {
    let query_service = Arc::new(
        StreamQueryService::new().with_stream("name:vm", (1..=70).map(instance).collect()),
    );

    let page = service(&query_service)
        .search_assets(
            AssetSearchInput {
                query: "name:vm".to_owned(),
                scope: Some("projects/demo".to_owned()),
                asset_types: Some(Vec::new()),
                page_size: Some(500),
                page_token: Some("60".to_owned()),
            },
            Some("token"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(page.records().len(), 10);
    assert!(page.is_last());

    let requests = query_service.requests();
    assert_eq!(requests[0].page_size, 50);
    assert_eq!(requests[0].page_token.as_deref(), Some("60"));
    assert!(requests[0].asset_types.is_empty());
}

#[tokio::test]
async fn search_assets_rejects_zero_page_size_before_authenticating() {
    let query_service = Arc::new(StreamQueryService::new());

    let result = service(&query_service)
        .search_assets(
            AssetSearchInput {
                query: "name:vm".to_owned(),
                page_size: Some(0),
                ..AssetSearchInput::default()
            },
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn search_without_token_is_unauthenticated() {
    let query_service = Arc::new(StreamQueryService::new());

    let result = service(&query_service)
        .search_assets(AssetSearchInput::default(), None)
        .await;

    assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    assert!(query_service.requests().is_empty());
}

#[tokio::test]
async fn search_resources_composes_active_filter() {
    let filter = "state=ACTIVE location:us-central1 name:vm";
    let query_service = Arc::new(
        StreamQueryService::new().with_stream(filter, (1..=80).map(instance).collect()),
    );

    let records = service(&query_service)
        .search_resources(
            ResourceSearchInput {
                query: Some(" name:vm ".to_owned()),
                scope: "projects/demo".to_owned(),
                location: Some("us-central1".to_owned()),
            },
            Some("token"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(records.len(), 50);
    assert_eq!(query_service.requests_for(filter), 1);
}

#[tokio::test]
async fn search_resources_without_terms_lists_active_resources() {
    let query_service = Arc::new(
        StreamQueryService::new().with_stream("state=ACTIVE", (1..=3).map(instance).collect()),
    );

    let records = service(&query_service)
        .search_resources(
            ResourceSearchInput {
                scope: "projects/demo".to_owned(),
                ..ResourceSearchInput::default()
            },
            Some("token"),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn service_health_audit_uses_ambient_token_and_project_queries() {
    let query_service = Arc::new(
        StreamQueryService::new()
            .with_stream("state=ACTIVE", vec![project(100), project(200)])
            .with_stream(MARKERS, vec![enabled_service(100, SERVICE_HEALTH_API)]),
    );
    let inventory = service(&query_service);
    let ambient = BearerToken::new("ambient").unwrap_or_else(|_| unreachable!());

    let result = with_ambient_token(
        Some(ambient),
        inventory.list_projects_without_service_health("organizations/1", None, None),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.flagged, vec!["projects/200".to_owned()]);
    assert!(!result.truncated);

    let requests = query_service.requests();
    let candidate = requests
        .iter()
        .find(|request| request.filter == "state=ACTIVE")
        .cloned()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(candidate.read_mask.as_deref(), Some("name"));
    assert_eq!(candidate.page_size, 50);
    assert_eq!(
        candidate.asset_types,
        vec![ResourceKind::PROJECT_ASSET_TYPE.to_owned()]
    );

    let marker = requests
        .iter()
        .find(|request| request.filter == MARKERS)
        .cloned()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(
        marker.asset_types,
        vec![ResourceKind::SERVICE_ASSET_TYPE.to_owned()]
    );
}

#[tokio::test]
async fn organization_ceiling_is_checked_before_authenticating() {
    let query_service = Arc::new(StreamQueryService::new());

    let result = service(&query_service)
        .list_projects_without_service_health("organizations/1", Some(101), None)
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert!(query_service.requests().is_empty());
}

#[tokio::test]
async fn organization_default_limit_respects_the_ceiling() {
    let query_service = Arc::new(
        StreamQueryService::new()
            .with_stream("state=ACTIVE", vec![project(100), project(200)])
            .with_stream(MARKERS, vec![enabled_service(100, SERVICE_HEALTH_API)]),
    );
    let inventory = service_with_policy(
        &query_service,
        AuditPolicy {
            default_max_projects: 200,
            ..AuditPolicy::default()
        },
    );

    let organization = inventory
        .list_projects_without_service_health("organizations/1", None, Some("token"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let project_scope = inventory
        .list_projects_without_service_health("projects/p", None, Some("token"))
        .await;
    let oversized = inventory
        .list_projects_without_service_health("organizations/1", Some(200), Some("token"))
        .await;

    assert_eq!(organization.flagged, vec!["projects/200".to_owned()]);
    let candidate_sizes: Vec<u32> = query_service
        .requests()
        .iter()
        .filter(|request| request.filter == "state=ACTIVE")
        .map(|request| request.page_size)
        .collect();
    assert_eq!(candidate_sizes, vec![100, 200]);
    assert!(project_scope.is_ok());
    assert!(matches!(oversized, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn blank_scope_and_service_are_rejected() {
    let query_service = Arc::new(StreamQueryService::new());
    let inventory = service(&query_service);

    let blank_scope = inventory
        .audit_service_enablement(" ", SERVICE_HEALTH_API, None, Some("token"))
        .await;
    let blank_service = inventory
        .audit_service_enablement("projects/demo", "", None, Some("token"))
        .await;
    let zero_projects = inventory
        .audit_service_enablement("projects/demo", SERVICE_HEALTH_API, Some(0), Some("token"))
        .await;

    assert!(matches!(blank_scope, Err(AppError::InvalidInput(_))));
    assert!(matches!(blank_service, Err(AppError::InvalidInput(_))));
    assert!(matches!(zero_projects, Err(AppError::InvalidInput(_))));
    assert!(query_service.requests().is_empty());
}
