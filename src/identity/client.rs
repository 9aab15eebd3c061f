use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::identity::{AuthError, IdentityProvider, UserIdentity};

/// HTTP client for the managed identity service (GoTrue-shaped API).
///
/// Constructed once at startup and handed to the router through shared state;
/// per-request work is a single `GET /auth/v1/user` with the caller's bearer
/// token.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    user_endpoint: Url,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct IdentityUserResponse {
    id: String,
    email: Option<String>,
}

impl HttpIdentityProvider {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, AuthError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AuthError::Config(format!("invalid identity service URL: {}", e)))?;
        let user_endpoint = base_url
            .join("auth/v1/user")
            .map_err(|e| AuthError::Config(format!("invalid identity service URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self {
            http,
            user_endpoint,
            service_key: config.service_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<UserIdentity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidCredential("Empty bearer token".to_string()));
        }

        let response = self
            .http
            .get(self.user_endpoint.clone())
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidCredential(format!(
                "Identity service rejected token ({})",
                response.status()
            )));
        }

        let user: IdentityUserResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidCredential(format!("Malformed identity response: {}", e)))?;

        let id = Uuid::parse_str(&user.id).map_err(|_| {
            AuthError::InvalidCredential(format!("Identity service returned invalid user id: {}", user.id))
        })?;

        Ok(UserIdentity { id, email: user.email })
    }
}
