use std::fmt::{Debug, Formatter};

use crate::{AppError, AppResult};

/// Opaque OAuth bearer token supplied by a caller.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Creates a bearer token, rejecting blank values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Unauthenticated(
                "bearer token must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    #[must_use]
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let token = value.strip_prefix("Bearer ")?;
        Self::new(token).ok()
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for BearerToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("BearerToken(<redacted>)")
    }
}

/// Credential owned by exactly one tool invocation.
///
/// Not `Clone`. Adapters borrow it for one call and it drops with the
/// invocation.
#[derive(PartialEq, Eq)]
pub struct Credential {
    token: BearerToken,
}

impl Credential {
    /// Creates a credential from a resolved bearer token.
    #[must_use]
    pub fn from_token(token: BearerToken) -> Self {
        Self { token }
    }

    /// Returns the value for an outbound `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token.secret())
    }

    /// Returns the underlying access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.token.secret()
    }
}

impl Debug for Credential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("Credential(<redacted>)")
    }
}
