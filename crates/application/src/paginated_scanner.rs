//! Budgeted pagination over the asset search port.
//!
//! Single-page reads (`scan_page`) and budgeted multi-page scans
//! (`ScanCursor`, `collect`, `drain`) are separate operations with separate
//! return types. Neither follows a continuation token unless the budget
//! allows another page.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use assetlens_core::{AppError, AppResult, Credential};
use assetlens_domain::{Page, ResourceQuery, ResourceRecord, ScanBudget};

use crate::query_ports::{PageRequest, ResourceQueryService};

/// Consumption counters of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Page fetches issued.
    pub pages_consumed: u32,
    /// Records handed to the caller.
    pub records_yielded: u32,
    /// True when the scan stopped on its budget while more data existed.
    pub truncated: bool,
}

/// Records collected by a scan together with its final counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanBatch {
    /// Records in stream order.
    pub records: Vec<ResourceRecord>,
    /// Final counters.
    pub progress: ScanProgress,
}

/// Scan aborted by a query service error.
///
/// `partial` keeps every record produced before the failure. For
/// [`ScanCursor::drain`] those records were already handed to the callback,
/// so only the counters are carried.
#[derive(Debug, Error)]
#[error(
    "{cause} (after {} page(s), {} record(s))",
    .partial.progress.pages_consumed,
    .partial.progress.records_yielded
)]
pub struct ScanFailure {
    /// Underlying error.
    pub cause: AppError,
    /// Output produced before the failure.
    pub partial: ScanBatch,
}

impl From<ScanFailure> for AppError {
    fn from(value: ScanFailure) -> Self {
        value.cause
    }
}

/// Page allowance shared by concurrent scans of one invocation.
#[derive(Debug)]
pub struct PageAllowance {
    remaining: AtomicU32,
}

impl PageAllowance {
    /// Creates an allowance of `pages` fetches.
    #[must_use]
    pub fn new(pages: u32) -> Self {
        Self {
            remaining: AtomicU32::new(pages),
        }
    }

    /// Takes one page from the allowance, returning false when exhausted.
    pub fn try_acquire(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }

    /// Pages left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }
}

/// Budget-enforcing wrapper around [`ResourceQueryService`].
#[derive(Clone)]
pub struct PaginatedScanner {
    query_service: Arc<dyn ResourceQueryService>,
}

impl PaginatedScanner {
    /// Creates a scanner over a query service.
    #[must_use]
    pub fn new(query_service: Arc<dyn ResourceQueryService>) -> Self {
        Self { query_service }
    }

    /// Fetches exactly one page of at most `query.page_size()` records.
    ///
    /// The continuation token is returned to the caller and never followed.
    /// An oversized response is clipped and reported through
    /// [`Page::is_clipped`].
    pub async fn scan_page(
        &self,
        credential: &Credential,
        query: &ResourceQuery,
        page_token: Option<String>,
    ) -> AppResult<Page> {
        let page_size = query.page_size();
        let request = PageRequest::for_query(query, page_size, page_token);
        let page = self
            .query_service
            .fetch_page(credential, request)
            .await
            .map_err(scan_error)?;

        let page = page.clip_to(usize::try_from(page_size).unwrap_or(usize::MAX));
        if page.is_clipped() {
            warn!(
                scope = %query.scope(),
                page_size,
                "backend returned an oversized page, extra records dropped"
            );
        }

        Ok(page)
    }

    /// Starts a lazy budgeted scan.
    #[must_use]
    pub fn cursor<'a>(
        &'a self,
        credential: &'a Credential,
        query: &'a ResourceQuery,
        budget: ScanBudget,
    ) -> ScanCursor<'a> {
        ScanCursor {
            query_service: self.query_service.as_ref(),
            credential,
            query,
            budget,
            allowance: None,
            next_page_token: None,
            progress: ScanProgress::default(),
            finished: false,
        }
    }

    /// Collects up to `budget.max_records()` records.
    pub async fn collect(
        &self,
        credential: &Credential,
        query: &ResourceQuery,
        budget: ScanBudget,
    ) -> Result<ScanBatch, ScanFailure> {
        self.cursor(credential, query, budget).collect().await
    }

    /// Streams every record within budget into `on_record`.
    pub async fn drain<F>(
        &self,
        credential: &Credential,
        query: &ResourceQuery,
        budget: ScanBudget,
        on_record: F,
    ) -> Result<ScanProgress, ScanFailure>
    where
        F: FnMut(ResourceRecord) + Send,
    {
        self.cursor(credential, query, budget).drain(on_record).await
    }
}

/// Lazy page-by-page scan bounded by a [`ScanBudget`].
///
/// Every page is an await point; dropping the cursor (or the future driving
/// it) stops further fetches.
pub struct ScanCursor<'a> {
    query_service: &'a dyn ResourceQueryService,
    credential: &'a Credential,
    query: &'a ResourceQuery,
    budget: ScanBudget,
    allowance: Option<&'a PageAllowance>,
    next_page_token: Option<String>,
    progress: ScanProgress,
    finished: bool,
}

impl<'a> ScanCursor<'a> {
    /// Draws every page fetch from a shared allowance as well.
    #[must_use]
    pub fn with_allowance(mut self, allowance: &'a PageAllowance) -> Self {
        self.allowance = Some(allowance);
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn progress(&self) -> ScanProgress {
        self.progress
    }

    /// Returns true once no further page will be fetched.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetches the next page within budget, or `None` once the scan ended.
    pub async fn next_page(&mut self) -> AppResult<Option<Vec<ResourceRecord>>> {
        if self.finished {
            return Ok(None);
        }

        if let Some(allowance) = self.allowance {
            if !allowance.try_acquire() {
                debug!(
                    scope = %self.query.scope(),
                    pages_consumed = self.progress.pages_consumed,
                    "shared page allowance exhausted"
                );
                self.stop(true);
                return Ok(None);
            }
        }

        let remaining_records = self
            .budget
            .max_records()
            .saturating_sub(self.progress.records_yielded);
        let page_size = self.query.page_size().min(remaining_records);
        let request = PageRequest::for_query(self.query, page_size, self.next_page_token.take());

        let page = match self.query_service.fetch_page(self.credential, request).await {
            Ok(page) => page,
            Err(error) => {
                self.finished = true;
                return Err(scan_error(error));
            }
        };

        self.progress.pages_consumed = self.progress.pages_consumed.saturating_add(1);
        let page = page.clip_to(usize::try_from(page_size).unwrap_or(usize::MAX));
        let clipped = page.is_clipped();
        let (records, next_page_token) = page.into_parts();
        self.progress.records_yielded = self
            .progress
            .records_yielded
            .saturating_add(u32::try_from(records.len()).unwrap_or(u32::MAX));

        debug!(
            scope = %self.query.scope(),
            filter = self.query.filter(),
            page = self.progress.pages_consumed,
            records = records.len(),
            clipped,
            "scan page fetched"
        );

        match next_page_token {
            _ if clipped => self.stop(true),
            None => self.stop(false),
            Some(token) => {
                let budget_spent = self.progress.pages_consumed >= self.budget.max_pages()
                    || self.progress.records_yielded >= self.budget.max_records();
                if budget_spent {
                    self.stop(true);
                } else {
                    self.next_page_token = Some(token);
                }
            }
        }

        Ok(Some(records))
    }

    /// Runs the scan to its end, collecting records.
    pub async fn collect(self) -> Result<ScanBatch, ScanFailure> {
        let mut records = Vec::new();
        let result = self.drain(|record| records.push(record)).await;

        match result {
            Ok(progress) => Ok(ScanBatch { records, progress }),
            Err(failure) => Err(ScanFailure {
                cause: failure.cause,
                partial: ScanBatch {
                    records,
                    progress: failure.partial.progress,
                },
            }),
        }
    }

    /// Runs the scan to its end, handing each record to `on_record`.
    pub async fn drain<F>(mut self, mut on_record: F) -> Result<ScanProgress, ScanFailure>
    where
        F: FnMut(ResourceRecord) + Send,
    {
        loop {
            match self.next_page().await {
                Ok(Some(records)) => records.into_iter().for_each(&mut on_record),
                Ok(None) => return Ok(self.progress),
                Err(cause) => {
                    return Err(ScanFailure {
                        cause,
                        partial: ScanBatch {
                            records: Vec::new(),
                            progress: self.progress,
                        },
                    });
                }
            }
        }
    }

    fn stop(&mut self, truncated: bool) {
        self.finished = true;
        self.next_page_token = None;
        self.progress.truncated |= truncated;
    }
}

fn scan_error(error: AppError) -> AppError {
    match error {
        AppError::ScanFailed(_) | AppError::Unauthenticated(_) => error,
        other => AppError::ScanFailed(other.to_string()),
    }
}
