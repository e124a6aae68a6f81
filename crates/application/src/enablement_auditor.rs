//! Bounded audit of which projects lack an enabled service.
//!
//! A candidate scan lists projects, a marker scan lists enabled-service
//! resources, and the result is their ordered set difference. Both scans
//! are budgeted, so the difference is only exact when neither truncated.

use std::collections::HashSet;

use tracing::{info, warn};

use assetlens_core::{AppError, AppResult, Credential};
use assetlens_domain::{AuditResult, ResourceQuery, ScanBudget, Scope};

use crate::paginated_scanner::{
    PageAllowance, PaginatedScanner, ScanBatch, ScanFailure, ScanProgress,
};

/// Budget limits applied to enablement audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditPolicy {
    /// Candidate records scanned when the caller names no limit.
    pub default_max_projects: u32,
    /// Hard ceiling on candidate records for organization scopes.
    pub organization_max_projects: u32,
    /// Minimum page size of the marker scan.
    pub marker_page_size: u32,
    /// Minimum page count of the marker scan.
    pub marker_max_pages: u32,
    /// Pages both scans of one audit may fetch together.
    pub max_total_pages: u32,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            default_max_projects: 50,
            organization_max_projects: 100,
            marker_page_size: 1000,
            marker_max_pages: 5,
            max_total_pages: 20,
        }
    }
}

impl AuditPolicy {
    /// Candidate limit used when the caller names none.
    ///
    /// Organization scopes never default above their ceiling.
    #[must_use]
    pub fn default_max_projects_for(&self, scope: &Scope) -> u32 {
        if scope.is_organization() {
            self.default_max_projects.min(self.organization_max_projects)
        } else {
            self.default_max_projects
        }
    }
}

/// Runs candidate and marker scans and computes the projects missing a marker.
#[derive(Clone)]
pub struct EnablementAuditor {
    scanner: PaginatedScanner,
    policy: AuditPolicy,
}

impl EnablementAuditor {
    /// Creates an auditor.
    #[must_use]
    pub fn new(scanner: PaginatedScanner, policy: AuditPolicy) -> Self {
        Self { scanner, policy }
    }

    /// Active budget policy.
    #[must_use]
    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    /// Audits `scope`, flagging candidates with no marker observed.
    ///
    /// Inputs are validated before any page is fetched.
    pub async fn audit(
        &self,
        credential: &Credential,
        scope: &Scope,
        candidate_query: &ResourceQuery,
        marker_query: &ResourceQuery,
        budget: ScanBudget,
    ) -> AppResult<AuditResult> {
        self.validate(scope, candidate_query, marker_query, budget)?;

        let marker_budget = self.marker_budget(budget)?;
        let marker_query = marker_query
            .clone()
            .with_page_size(marker_query.page_size().max(self.policy.marker_page_size));
        let allowance = PageAllowance::new(
            budget
                .max_pages()
                .saturating_add(marker_budget.max_pages())
                .min(self.policy.max_total_pages),
        );

        let mut markers = HashSet::new();
        let candidate_scan = self
            .scanner
            .cursor(credential, candidate_query, budget)
            .with_allowance(&allowance)
            .collect();
        let marker_scan = self
            .scanner
            .cursor(credential, &marker_query, marker_budget)
            .with_allowance(&allowance)
            .drain(|record| {
                if let Some(project) = record.owning_project() {
                    markers.insert(project);
                }
            });

        let (candidate_outcome, marker_outcome) = tokio::join!(candidate_scan, marker_scan);
        let (candidates, marker_progress) = match (candidate_outcome, marker_outcome) {
            (Ok(candidates), Ok(marker_progress)) => (candidates, marker_progress),
            (candidate_outcome, marker_outcome) => {
                return Err(scan_failure(scope, candidate_outcome, marker_outcome));
            }
        };

        let candidate_projects = distinct_projects(&candidates);
        let flagged: Vec<String> = candidate_projects
            .iter()
            .filter(|project| !markers.contains(project.as_str()))
            .cloned()
            .collect();

        let result = AuditResult {
            flagged,
            scanned_count: candidate_projects.len(),
            truncated: candidates.progress.truncated || marker_progress.truncated,
            marker_count: markers.len(),
            candidate_pages: candidates.progress.pages_consumed,
            marker_pages: marker_progress.pages_consumed,
        };

        info!(
            scope = %scope,
            scanned_count = result.scanned_count,
            marker_count = result.marker_count,
            flagged = result.flagged.len(),
            truncated = result.truncated,
            "enablement audit finished"
        );

        Ok(result)
    }

    pub(crate) fn validate(
        &self,
        scope: &Scope,
        candidate_query: &ResourceQuery,
        marker_query: &ResourceQuery,
        budget: ScanBudget,
    ) -> AppResult<()> {
        if candidate_query.scope() != scope || marker_query.scope() != scope {
            return Err(AppError::InvalidInput(format!(
                "audit queries must target scope '{scope}'"
            )));
        }

        if scope.is_organization() && budget.max_records() > self.policy.organization_max_projects
        {
            return Err(AppError::InvalidInput(format!(
                "max_projects limited to {} for organization scopes",
                self.policy.organization_max_projects
            )));
        }

        Ok(())
    }

    fn marker_budget(&self, budget: ScanBudget) -> AppResult<ScanBudget> {
        let max_pages = budget.max_pages().max(self.policy.marker_max_pages);
        ScanBudget::new(
            max_pages,
            max_pages.saturating_mul(self.policy.marker_page_size.max(1)),
        )
    }
}

fn distinct_projects(batch: &ScanBatch) -> Vec<String> {
    let mut seen = HashSet::new();
    batch
        .records
        .iter()
        .filter_map(|record| record.owning_project())
        .filter(|project| seen.insert(project.clone()))
        .collect()
}

fn scan_failure(
    scope: &Scope,
    candidate_outcome: Result<ScanBatch, ScanFailure>,
    marker_outcome: Result<ScanProgress, ScanFailure>,
) -> AppError {
    let candidate_progress = match &candidate_outcome {
        Ok(batch) => batch.progress,
        Err(failure) => failure.partial.progress,
    };
    let marker_progress = match &marker_outcome {
        Ok(progress) => *progress,
        Err(failure) => failure.partial.progress,
    };
    let cause = match (candidate_outcome, marker_outcome) {
        (Err(failure), _) | (Ok(_), Err(failure)) => failure.cause,
        (Ok(_), Ok(_)) => AppError::Internal("audit scans reported no failure".to_owned()),
    };

    warn!(
        scope = %scope,
        candidate_pages = candidate_progress.pages_consumed,
        candidate_records = candidate_progress.records_yielded,
        marker_pages = marker_progress.pages_consumed,
        marker_records = marker_progress.records_yielded,
        error = %cause,
        "enablement audit aborted"
    );

    match cause {
        AppError::Unauthenticated(_) => cause,
        AppError::ScanFailed(message) => AppError::ScanFailed(format!(
            "{message}; candidate scan read {} page(s) and {} record(s), \
             marker scan read {} page(s) and {} record(s)",
            candidate_progress.pages_consumed,
            candidate_progress.records_yielded,
            marker_progress.pages_consumed,
            marker_progress.records_yielded
        )),
        other => other,
    }
}
