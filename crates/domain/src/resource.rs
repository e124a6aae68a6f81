use serde::{Deserialize, Serialize};

use crate::scope::project_reference;

/// Resource kind derived from the asset type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// `cloudresourcemanager.googleapis.com/Project`.
    Project,
    /// `serviceusage.googleapis.com/Service`.
    Service,
    /// `compute.googleapis.com/Instance`.
    ComputeInstance,
    /// Any other asset type.
    Other(String),
}

impl ResourceKind {
    /// Asset type selector for projects.
    pub const PROJECT_ASSET_TYPE: &'static str = "cloudresourcemanager.googleapis.com/Project";
    /// Asset type selector for enabled services.
    pub const SERVICE_ASSET_TYPE: &'static str = "serviceusage.googleapis.com/Service";
    /// Asset type selector for compute instances.
    pub const COMPUTE_INSTANCE_ASSET_TYPE: &'static str = "compute.googleapis.com/Instance";

    /// Classifies an asset type string.
    #[must_use]
    pub fn from_asset_type(asset_type: &str) -> Self {
        match asset_type {
            Self::PROJECT_ASSET_TYPE => Self::Project,
            Self::SERVICE_ASSET_TYPE => Self::Service,
            Self::COMPUTE_INSTANCE_ASSET_TYPE => Self::ComputeInstance,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One resource returned by an asset search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Canonical full resource name.
    pub name: String,
    /// Asset type tag.
    #[serde(default)]
    pub asset_type: String,
    /// Owning project, formatted `projects/<number>`.
    #[serde(default)]
    pub project: Option<String>,
    /// Human readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Resource location.
    #[serde(default)]
    pub location: Option<String>,
    /// Lifecycle state reported by the owning service.
    #[serde(default)]
    pub state: Option<String>,
}

impl ResourceRecord {
    /// Creates a record with the mandatory identity fields.
    #[must_use]
    pub fn new(name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_type: asset_type.into(),
            project: None,
            display_name: None,
            location: None,
            state: None,
        }
    }

    /// Sets the owning project reference.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the lifecycle state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_asset_type(self.asset_type.as_str())
    }

    /// Returns the owning project, falling back to the `projects/<id>`
    /// segment of the resource name when the project field is empty.
    #[must_use]
    pub fn owning_project(&self) -> Option<String> {
        self.project
            .as_deref()
            .filter(|project| !project.trim().is_empty())
            .and_then(project_reference)
            .or_else(|| project_reference(self.name.as_str()))
    }
}

/// One page of search results.
///
/// A page clipped to a size limit is never the last page: the records it
/// dropped are still unread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    records: Vec<ResourceRecord>,
    next_page_token: Option<String>,
    clipped: bool,
}

impl Page {
    /// Creates a page. Blank continuation tokens are treated as absent.
    #[must_use]
    pub fn new(records: Vec<ResourceRecord>, next_page_token: Option<String>) -> Self {
        Self {
            records,
            next_page_token: next_page_token.filter(|token| !token.is_empty()),
            clipped: false,
        }
    }

    /// Keeps at most `limit` records, marking the page clipped when any are dropped.
    #[must_use]
    pub fn clip_to(mut self, limit: usize) -> Self {
        if self.records.len() > limit {
            self.records.truncate(limit);
            self.clipped = true;
        }
        self
    }

    /// Returns true when records were dropped by [`Page::clip_to`].
    #[must_use]
    pub fn is_clipped(&self) -> bool {
        self.clipped
    }

    /// Records on this page.
    #[must_use]
    pub fn records(&self) -> &[ResourceRecord] {
        self.records.as_slice()
    }

    /// Continuation token, absent on the final page.
    #[must_use]
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Returns true when no further page follows and nothing was clipped.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none() && !self.clipped
    }

    /// Splits the page into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ResourceRecord>, Option<String>) {
        (self.records, self.next_page_token)
    }
}
