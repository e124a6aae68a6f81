use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use assetlens_core::{AppError, AppResult, BearerToken, Credential};
use assetlens_domain::{Page, ResourceRecord};

use crate::query_ports::{PageRequest, ResourceQueryService};

pub(crate) fn test_credential() -> Credential {
    Credential::from_token(BearerToken::new("test-token").unwrap_or_else(|_| unreachable!()))
}

pub(crate) fn project(number: u32) -> ResourceRecord {
    ResourceRecord::new(
        format!("//cloudresourcemanager.googleapis.com/projects/{number}"),
        "cloudresourcemanager.googleapis.com/Project",
    )
    .with_project(format!("projects/{number}"))
    .with_state("ACTIVE")
}

pub(crate) fn enabled_service(number: u32, service: &str) -> ResourceRecord {
    ResourceRecord::new(
        format!("//serviceusage.googleapis.com/projects/{number}/services/{service}"),
        "serviceusage.googleapis.com/Service",
    )
    .with_project(format!("projects/{number}"))
    .with_state("ENABLED")
}

/// Query service serving one record stream per filter, paged by offset tokens.
#[derive(Default)]
pub(crate) struct StreamQueryService {
    streams: HashMap<String, Vec<ResourceRecord>>,
    server_page_size: Option<usize>,
    ignore_page_size: bool,
    failures: HashMap<String, u32>,
    requests: Mutex<Vec<PageRequest>>,
}

impl StreamQueryService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_stream(mut self, filter: &str, records: Vec<ResourceRecord>) -> Self {
        self.streams.insert(filter.to_owned(), records);
        self
    }

    /// Caps every page at `page_size` records regardless of the request.
    pub(crate) fn with_server_page_size(mut self, page_size: usize) -> Self {
        self.server_page_size = Some(page_size);
        self
    }

    /// Returns whole server pages even when the request asks for fewer.
    pub(crate) fn ignoring_page_size(mut self) -> Self {
        self.ignore_page_size = true;
        self
    }

    /// Fails the fetch of the given zero-based page for `filter`.
    pub(crate) fn failing_on_page(mut self, filter: &str, page_index: u32) -> Self {
        self.failures.insert(filter.to_owned(), page_index);
        self
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub(crate) fn requests_for(&self, filter: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.filter == filter)
            .count()
    }
}

#[async_trait]
impl ResourceQueryService for StreamQueryService {
    async fn fetch_page(&self, _credential: &Credential, request: PageRequest) -> AppResult<Page> {
        let page_index = u32::try_from(
            self.requests()
                .iter()
                .filter(|previous| previous.filter == request.filter)
                .count(),
        )
        .unwrap_or(u32::MAX);
        self.requests
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock requests: {error}")))?
            .push(request.clone());

        if self.failures.get(&request.filter) == Some(&page_index) {
            return Err(AppError::Internal("backend unavailable".to_owned()));
        }

        let stream = self
            .streams
            .get(&request.filter)
            .cloned()
            .unwrap_or_default();
        let offset = request
            .page_token
            .as_deref()
            .and_then(|token| token.parse::<usize>().ok())
            .unwrap_or(0);

        let server_limit = self.server_page_size.unwrap_or(usize::MAX);
        let requested = usize::try_from(request.page_size).unwrap_or(usize::MAX);
        let take = if self.ignore_page_size {
            server_limit
        } else {
            server_limit.min(requested)
        };

        let records: Vec<ResourceRecord> = stream.iter().skip(offset).take(take).cloned().collect();
        let next_offset = offset + records.len();
        let next_page_token = (next_offset < stream.len()).then(|| next_offset.to_string());

        Ok(Page::new(records, next_page_token))
    }
}
