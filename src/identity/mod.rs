mod client;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use client::HttpIdentityProvider;

/// Errors from bearer credential resolution. Both failure kinds surface to
/// API clients as `Unauthenticated`; `Config` only occurs at startup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid authentication credentials: {0}")]
    InvalidCredential(String),

    #[error("Identity service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("Identity service misconfigured: {0}")]
    Config(String),
}

/// A resolved identity: the stable user identifier issued by the identity
/// service plus the claims it embeds. Role is NOT a claim; it lives in the
/// stored profile and is read there by the authorization policy.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Seam to the external identity service: maps an opaque bearer token to a
/// user identity, with no side effects.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<UserIdentity, AuthError>;
}
