use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use assetlens_application::{PageRequest, ResourceQueryService};
use assetlens_core::{AppError, AppResult, Credential};
use assetlens_domain::{Page, ResourceRecord, Scope, ScopeKind};

/// Largest page the in-memory backend returns, matching the hosted API.
pub const MAX_SERVER_PAGE_SIZE: u32 = 500;

/// In-memory asset search with offset page tokens.
///
/// Filters support whitespace-separated `field=value` (exact) and
/// `field:value` (substring) terms over `name`, `assetType`, `project`,
/// `displayName`, `location` and `state`. Bare terms match the name or
/// display name. All comparisons ignore ASCII case.
#[derive(Debug, Default)]
pub struct InMemoryResourceQueryService {
    records: RwLock<Vec<ResourceRecord>>,
    fetches: AtomicU32,
}

impl InMemoryResourceQueryService {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `records` in order.
    #[must_use]
    pub fn with_records(records: Vec<ResourceRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            fetches: AtomicU32::new(0),
        }
    }

    /// Appends records to the stream.
    pub async fn insert(&self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.records.write().await.extend(records);
    }

    /// Page fetches served so far.
    #[must_use]
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Term {
    Exact(String, String),
    Contains(String, String),
    Text(String),
}

fn parse_filter(filter: &str) -> AppResult<Vec<Term>> {
    filter
        .split_whitespace()
        .map(|term| {
            let (field, value, exact) = if let Some((field, value)) = term.split_once('=') {
                (field, value, true)
            } else if let Some((field, value)) = term.split_once(':') {
                (field, value, false)
            } else {
                return Ok(Term::Text(term.to_ascii_lowercase()));
            };

            if !is_known_field(field) {
                return Err(AppError::InvalidInput(format!(
                    "unsupported filter term '{term}'"
                )));
            }

            let (field, value) = (field.to_owned(), value.to_ascii_lowercase());
            Ok(if exact {
                Term::Exact(field, value)
            } else {
                Term::Contains(field, value)
            })
        })
        .collect()
}

fn is_known_field(field: &str) -> bool {
    matches!(
        field,
        "name" | "assetType" | "project" | "displayName" | "location" | "state"
    )
}

fn field_value<'a>(record: &'a ResourceRecord, field: &str) -> Option<&'a str> {
    match field {
        "name" => Some(record.name.as_str()),
        "assetType" => Some(record.asset_type.as_str()),
        "project" => record.project.as_deref(),
        "displayName" => record.display_name.as_deref(),
        "location" => record.location.as_deref(),
        "state" => record.state.as_deref(),
        _ => None,
    }
}

fn term_matches(record: &ResourceRecord, term: &Term) -> bool {
    match term {
        Term::Exact(field, expected) => field_value(record, field)
            .is_some_and(|value| value.to_ascii_lowercase() == *expected),
        Term::Contains(field, needle) => field_value(record, field)
            .is_some_and(|value| value.to_ascii_lowercase().contains(needle.as_str())),
        Term::Text(needle) => [Some(record.name.as_str()), record.display_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| value.to_ascii_lowercase().contains(needle.as_str())),
    }
}

fn in_scope(record: &ResourceRecord, scope: &Scope) -> bool {
    match scope.kind() {
        ScopeKind::Project => {
            record.owning_project().as_deref() == Some(scope.as_str())
                || record.name.contains(&format!("/{}/", scope.as_str()))
                || record.name.ends_with(&format!("/{}", scope.as_str()))
        }
        _ => true,
    }
}

#[async_trait]
impl ResourceQueryService for InMemoryResourceQueryService {
    async fn fetch_page(&self, _credential: &Credential, request: PageRequest) -> AppResult<Page> {
        let scope = Scope::new(request.scope.as_str())?;
        let terms = parse_filter(&request.filter)?;
        let offset = match request.page_token.as_deref() {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                AppError::InvalidInput(format!("invalid page token '{token}'"))
            })?,
        };
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let records = self.records.read().await;
        let matching: Vec<&ResourceRecord> = records
            .iter()
            .filter(|record| {
                request.asset_types.is_empty() || request.asset_types.contains(&record.asset_type)
            })
            .filter(|record| in_scope(record, &scope))
            .filter(|record| terms.iter().all(|term| term_matches(record, term)))
            .collect();

        let page_size =
            usize::try_from(request.page_size.clamp(1, MAX_SERVER_PAGE_SIZE)).unwrap_or(1);
        let page: Vec<ResourceRecord> = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|record| ResourceRecord::clone(record))
            .collect();
        let next_offset = offset.saturating_add(page.len());
        let next_page_token = (next_offset < matching.len()).then(|| next_offset.to_string());

        Ok(Page::new(page, next_page_token))
    }
}

#[cfg(test)]
mod tests {
    use assetlens_core::BearerToken;
    use assetlens_domain::ResourceKind;

    use super::*;

    fn credential() -> Credential {
        Credential::from_token(BearerToken::new("memory").unwrap_or_else(|_| unreachable!()))
    }

    fn request(scope: &str, filter: &str, page_size: u32, token: Option<&str>) -> PageRequest {
        PageRequest {
            scope: scope.to_owned(),
            filter: filter.to_owned(),
            asset_types: Vec::new(),
            page_size,
            page_token: token.map(str::to_owned),
            read_mask: None,
        }
    }

    fn backend() -> InMemoryResourceQueryService {
        let mut records: Vec<ResourceRecord> = (1..=5)
            .map(|number| {
                ResourceRecord::new(
                    format!("//cloudresourcemanager.googleapis.com/projects/{number}"),
                    ResourceKind::PROJECT_ASSET_TYPE,
                )
                .with_project(format!("projects/{number}"))
                .with_state(if number == 5 { "DELETE_REQUESTED" } else { "ACTIVE" })
            })
            .collect();
        records.push(
            ResourceRecord::new(
                "//serviceusage.googleapis.com/projects/1/services/servicehealth.googleapis.com",
                ResourceKind::SERVICE_ASSET_TYPE,
            )
            .with_project("projects/1")
            .with_state("ENABLED"),
        );
        InMemoryResourceQueryService::with_records(records)
    }

    #[tokio::test]
    async fn pages_follow_offset_tokens() {
        let backend = backend();

        let first = backend
            .fetch_page(&credential(), request("organizations/1", "state=ACTIVE", 3, None))
            .await
            .unwrap_or_else(|_| unreachable!());
        let second = backend
            .fetch_page(
                &credential(),
                request("organizations/1", "state=ACTIVE", 3, first.next_page_token()),
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(first.records().len(), 3);
        assert_eq!(second.records().len(), 1);
        assert!(second.is_last());
        assert_eq!(backend.fetch_count(), 2);
    }

    #[tokio::test]
    async fn filters_select_by_field_and_asset_type() {
        let backend = backend();
        let mut markers = request(
            "organizations/1",
            "name:servicehealth.googleapis.com",
            50,
            None,
        );
        markers.asset_types = vec![ResourceKind::SERVICE_ASSET_TYPE.to_owned()];

        let page = backend
            .fetch_page(&credential(), markers)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(page.records().len(), 1);
        assert_eq!(page.records()[0].project.as_deref(), Some("projects/1"));
    }

    #[tokio::test]
    async fn project_scope_limits_results() {
        let page = backend()
            .fetch_page(&credential(), request("projects/1", "", 50, None))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(page.records().len(), 2);
    }

    #[tokio::test]
    async fn unsupported_terms_and_tokens_are_rejected() {
        let backend = backend();

        let bad_term = backend
            .fetch_page(&credential(), request("organizations/1", "owner=me", 5, None))
            .await;
        let bad_token = backend
            .fetch_page(
                &credential(),
                request("organizations/1", "", 5, Some("not-a-number")),
            )
            .await;

        assert!(matches!(bad_term, Err(AppError::InvalidInput(_))));
        assert!(matches!(bad_token, Err(AppError::InvalidInput(_))));
    }
}
