use assetlens_core::{AppResult, Credential};
use assetlens_domain::{Page, ResourceQuery};
use async_trait::async_trait;

/// One page fetch against the asset search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Search scope such as `organizations/123`.
    pub scope: String,
    /// Filter expression.
    pub filter: String,
    /// Asset type selectors; empty selects every type.
    pub asset_types: Vec<String>,
    /// Maximum records the backend should return for this page.
    pub page_size: u32,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
    /// Optional field mask.
    pub read_mask: Option<String>,
}

impl PageRequest {
    /// Builds the request for one page of `query`.
    #[must_use]
    pub fn for_query(query: &ResourceQuery, page_size: u32, page_token: Option<String>) -> Self {
        Self {
            scope: query.scope().as_str().to_owned(),
            filter: query.filter().to_owned(),
            asset_types: query.asset_types().to_vec(),
            page_size,
            page_token,
            read_mask: query.read_mask().map(str::to_owned),
        }
    }
}

/// Port for paginated asset search execution.
#[async_trait]
pub trait ResourceQueryService: Send + Sync {
    /// Fetches one page. Implementations must not follow continuation tokens
    /// on their own.
    async fn fetch_page(&self, credential: &Credential, request: PageRequest) -> AppResult<Page>;
}
