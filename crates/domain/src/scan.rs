use assetlens_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Default page size for user-facing listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Asset search query, independent of pagination state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    scope: Scope,
    filter: String,
    asset_types: Vec<String>,
    page_size: u32,
    read_mask: Option<String>,
}

impl ResourceQuery {
    /// Creates a query with the default page size and no type selectors.
    #[must_use]
    pub fn new(scope: Scope, filter: impl Into<String>) -> Self {
        Self {
            scope,
            filter: filter.into(),
            asset_types: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            read_mask: None,
        }
    }

    /// Restricts the query to the given asset types.
    #[must_use]
    pub fn with_asset_types<I, S>(mut self, asset_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_types = asset_types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the maximum number of records a single page may carry.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Limits the fields returned per record.
    #[must_use]
    pub fn with_read_mask(mut self, read_mask: impl Into<String>) -> Self {
        self.read_mask = Some(read_mask.into());
        self
    }

    /// Search scope.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Filter expression.
    #[must_use]
    pub fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Asset type selectors.
    #[must_use]
    pub fn asset_types(&self) -> &[String] {
        self.asset_types.as_slice()
    }

    /// Maximum records per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Optional field mask.
    #[must_use]
    pub fn read_mask(&self) -> Option<&str> {
        self.read_mask.as_deref()
    }
}

/// Page and record ceiling for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBudget {
    max_pages: u32,
    max_records: u32,
}

impl ScanBudget {
    /// Creates a budget. Both limits must be positive.
    pub fn new(max_pages: u32, max_records: u32) -> AppResult<Self> {
        if max_pages == 0 {
            return Err(AppError::InvalidInput(
                "scan budget max_pages must be positive".to_owned(),
            ));
        }
        if max_records == 0 {
            return Err(AppError::InvalidInput(
                "scan budget max_records must be positive".to_owned(),
            ));
        }

        Ok(Self {
            max_pages,
            max_records,
        })
    }

    /// Budget that fetches exactly one page of at most `max_records`.
    pub fn single_page(max_records: u32) -> AppResult<Self> {
        Self::new(1, max_records)
    }

    /// Maximum number of page fetches.
    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Maximum number of records returned.
    #[must_use]
    pub fn max_records(&self) -> u32 {
        self.max_records
    }
}
