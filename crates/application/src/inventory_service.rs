use std::sync::Arc;

use tracing::info;

use assetlens_core::{AppError, AppResult, Credential, NonEmptyString};
use assetlens_domain::{
    AuditResult, DEFAULT_PAGE_SIZE, Page, ResourceKind, ResourceQuery, ResourceRecord, ScanBudget,
    Scope,
};

use crate::authenticator::{Authenticator, resolve_credential};
use crate::enablement_auditor::EnablementAuditor;
use crate::paginated_scanner::PaginatedScanner;

/// Service whose enablement `list_projects_without_service_health` audits.
pub const SERVICE_HEALTH_API: &str = "servicehealth.googleapis.com";

/// Records returned by a resource search.
pub const RESOURCE_SEARCH_LIMIT: u32 = 50;

const ACTIVE_FILTER: &str = "state=ACTIVE";

/// One-page asset search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSearchInput {
    /// Asset search filter expression.
    pub query: String,
    /// Scope, defaulting to the configured scope.
    pub scope: Option<String>,
    /// Asset types; `None` selects compute instances, an empty list every type.
    pub asset_types: Option<Vec<String>>,
    /// Requested page size, capped at [`DEFAULT_PAGE_SIZE`].
    pub page_size: Option<u32>,
    /// Continuation token of a previous call.
    pub page_token: Option<String>,
}

/// Active-resource search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSearchInput {
    /// Additional filter terms.
    pub query: Option<String>,
    /// Scope to search.
    pub scope: String,
    /// Optional location restriction such as `us-central1`.
    pub location: Option<String>,
}

/// Asset Inventory use cases: search and enablement audits.
#[derive(Clone)]
pub struct InventoryService {
    authenticator: Arc<dyn Authenticator>,
    scanner: PaginatedScanner,
    auditor: EnablementAuditor,
    default_scope: Scope,
}

impl InventoryService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        scanner: PaginatedScanner,
        auditor: EnablementAuditor,
        default_scope: Scope,
    ) -> Self {
        Self {
            authenticator,
            scanner,
            auditor,
            default_scope,
        }
    }

    /// Fetches exactly one page of assets and its continuation token.
    pub async fn search_assets(
        &self,
        input: AssetSearchInput,
        explicit_token: Option<&str>,
    ) -> AppResult<Page> {
        let scope = match input.scope {
            Some(scope) => Scope::new(scope)?,
            None => self.default_scope.clone(),
        };
        let page_size = match input.page_size {
            Some(0) => {
                return Err(AppError::InvalidInput(
                    "page_size must be positive".to_owned(),
                ));
            }
            Some(page_size) => page_size.min(DEFAULT_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };
        let asset_types = input
            .asset_types
            .unwrap_or_else(|| vec![ResourceKind::COMPUTE_INSTANCE_ASSET_TYPE.to_owned()]);
        let query = ResourceQuery::new(scope, input.query)
            .with_asset_types(asset_types)
            .with_page_size(page_size);
        let page_token = input.page_token.filter(|token| !token.is_empty());

        let credential = self.credential(explicit_token).await?;
        self.scanner
            .scan_page(&credential, &query, page_token)
            .await
    }

    /// Lists up to [`RESOURCE_SEARCH_LIMIT`] active resources.
    pub async fn search_resources(
        &self,
        input: ResourceSearchInput,
        explicit_token: Option<&str>,
    ) -> AppResult<Vec<ResourceRecord>> {
        let scope = Scope::new(input.scope)?;
        let query = ResourceQuery::new(
            scope,
            active_resource_filter(input.location.as_deref(), input.query.as_deref()),
        )
        .with_page_size(RESOURCE_SEARCH_LIMIT);
        let budget = ScanBudget::single_page(RESOURCE_SEARCH_LIMIT)?;

        let credential = self.credential(explicit_token).await?;
        let batch = self.scanner.collect(&credential, &query, budget).await?;

        Ok(batch.records)
    }

    /// Audits which active projects in `scope` lack `service`.
    ///
    /// At most `max_projects` candidates are examined, from one page.
    pub async fn audit_service_enablement(
        &self,
        scope: &str,
        service: &str,
        max_projects: Option<u32>,
        explicit_token: Option<&str>,
    ) -> AppResult<AuditResult> {
        let scope = Scope::new(scope)?;
        let service = NonEmptyString::new(service.trim())?;
        let max_projects = max_projects
            .unwrap_or_else(|| self.auditor.policy().default_max_projects_for(&scope));
        let budget = ScanBudget::single_page(max_projects)?;

        let candidate_query = ResourceQuery::new(scope.clone(), ACTIVE_FILTER)
            .with_asset_types([ResourceKind::PROJECT_ASSET_TYPE])
            .with_read_mask("name")
            .with_page_size(max_projects);
        let marker_query = ResourceQuery::new(scope.clone(), format!("name:{}", service.as_str()))
            .with_asset_types([ResourceKind::SERVICE_ASSET_TYPE]);
        self.auditor
            .validate(&scope, &candidate_query, &marker_query, budget)?;

        let credential = self.credential(explicit_token).await?;
        let result = self
            .auditor
            .audit(&credential, &scope, &candidate_query, &marker_query, budget)
            .await?;

        info!(
            scope = %scope,
            service = service.as_str(),
            flagged = result.flagged.len(),
            "service enablement audited"
        );

        Ok(result)
    }

    /// Audits which active projects in `scope` lack the Service Health API.
    pub async fn list_projects_without_service_health(
        &self,
        scope: &str,
        max_projects: Option<u32>,
        explicit_token: Option<&str>,
    ) -> AppResult<AuditResult> {
        self.audit_service_enablement(scope, SERVICE_HEALTH_API, max_projects, explicit_token)
            .await
    }

    async fn credential(&self, explicit_token: Option<&str>) -> AppResult<Credential> {
        resolve_credential(self.authenticator.as_ref(), explicit_token).await
    }
}

fn active_resource_filter(location: Option<&str>, query: Option<&str>) -> String {
    let location = location
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .map(|location| format!("location:{location}"));
    let query = query
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_owned);

    std::iter::once(ACTIVE_FILTER.to_owned())
        .chain(location)
        .chain(query)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
