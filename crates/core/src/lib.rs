//! Shared primitives for all Rust crates in AssetLens.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{BearerToken, Credential};

/// Result type used across AssetLens crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant, rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No bearer token could be resolved for the invocation.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The underlying resource query failed, possibly mid-stream.
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
