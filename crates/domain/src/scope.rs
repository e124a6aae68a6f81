//! Resource hierarchy scopes and project identifiers.

use std::fmt::{Display, Formatter};

use assetlens_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Level of the resource hierarchy a scope denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// `organizations/<id>`.
    Organization,
    /// `folders/<id>`.
    Folder,
    /// `projects/<id>`.
    Project,
    /// Any other non-empty identifier.
    Other,
}

/// Validated, non-empty audit or search scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    /// Creates a scope, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("scope must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the scope string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the hierarchy level the scope denotes.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        if self.0.starts_with("organizations/") {
            ScopeKind::Organization
        } else if self.0.starts_with("folders/") {
            ScopeKind::Folder
        } else if self.0.starts_with("projects/") {
            ScopeKind::Project
        } else {
            ScopeKind::Other
        }
    }

    /// Returns true when the scope spans a whole organization.
    #[must_use]
    pub fn is_organization(&self) -> bool {
        self.kind() == ScopeKind::Organization
    }
}

impl Display for Scope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Short project identifier such as `my-project` or `123456`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a project id made of lowercase ASCII letters, digits and hyphens.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let is_valid = !value.is_empty()
            && value
                .chars()
                .all(|character| {
                    character.is_ascii_lowercase() || character.is_ascii_digit() || character == '-'
                })
            && value.chars().any(|character| character != '-');

        if !is_valid {
            return Err(AppError::InvalidInput(format!(
                "invalid project_id '{value}': must be lowercase alphanumeric with hyphens"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the project id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Extracts `projects/<id>` from a resource name or project reference.
///
/// Accepts bare references (`projects/123`) and full resource names
/// (`//serviceusage.googleapis.com/projects/123/services/x`).
#[must_use]
pub fn project_reference(value: &str) -> Option<String> {
    let mut segments = value.split('/');
    while let Some(segment) = segments.next() {
        if segment == "projects" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(|id| format!("projects/{id}"));
        }
    }

    None
}
