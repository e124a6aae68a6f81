//! Bearer token resolution for tool invocations.
//!
//! The ambient token lives in a tokio task-local that the HTTP layer scopes
//! around one request future. Other in-flight requests, and tasks spawned
//! from the request, never observe it.

use std::future::Future;

use async_trait::async_trait;

use assetlens_core::{AppError, AppResult, BearerToken, Credential};

tokio::task_local! {
    static AMBIENT_BEARER_TOKEN: Option<BearerToken>;
}

/// Runs `future` with `token` as the ambient bearer token.
pub async fn with_ambient_token<F>(token: Option<BearerToken>, future: F) -> F::Output
where
    F: Future,
{
    AMBIENT_BEARER_TOKEN.scope(token, future).await
}

/// Returns the ambient bearer token of the current request, if any.
#[must_use]
pub fn ambient_token() -> Option<BearerToken> {
    AMBIENT_BEARER_TOKEN
        .try_with(Clone::clone)
        .ok()
        .flatten()
}

/// Port that turns a bearer token into a credential.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves a credential. An explicit token takes precedence over the
    /// ambient one; with neither the call fails with `Unauthenticated`.
    async fn resolve(
        &self,
        explicit_token: Option<&str>,
        ambient_token: Option<BearerToken>,
    ) -> AppResult<Credential>;
}

/// Authenticator that wraps the resolved bearer token as an OAuth credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuthenticator;

impl BearerAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn resolve(
        &self,
        explicit_token: Option<&str>,
        ambient_token: Option<BearerToken>,
    ) -> AppResult<Credential> {
        let explicit = explicit_token
            .filter(|value| !value.trim().is_empty())
            .map(BearerToken::new)
            .transpose()?;

        explicit
            .or(ambient_token)
            .map(Credential::from_token)
            .ok_or_else(|| {
                AppError::Unauthenticated(
                    "no bearer token provided in header or arguments".to_owned(),
                )
            })
    }
}

/// Resolves the credential for the current invocation using its ambient token.
pub async fn resolve_credential(
    authenticator: &dyn Authenticator,
    explicit_token: Option<&str>,
) -> AppResult<Credential> {
    authenticator
        .resolve(explicit_token, ambient_token())
        .await
}
