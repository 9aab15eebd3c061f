// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// `Unauthenticated` (no usable credential) and `Forbidden` (resolved identity,
/// insufficient rights) are distinct kinds and are never collapsed into one
/// another anywhere in the service.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthenticated(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable (record store or identity service down)
    UpstreamUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthenticated(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::UpstreamUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthenticated(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::UpstreamUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors,
            } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn field_error(field: impl Into<String>, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), problem.into());
        ApiError::ValidationError {
            message: "Invalid input".to_string(),
            field_errors: Some(field_errors),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        ApiError::UpstreamUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::StoreError> for ApiError {
    fn from(err: crate::database::StoreError) -> Self {
        match err {
            crate::database::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::database::StoreError::ConfigMissing(key) => {
                tracing::error!("Missing store configuration: {}", key);
                ApiError::upstream_unavailable("Record store is not configured")
            }
            crate::database::StoreError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Store query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            crate::database::StoreError::Sqlx(sqlx::Error::PoolTimedOut) => {
                ApiError::upstream_unavailable("Record store temporarily unavailable")
            }
            crate::database::StoreError::Sqlx(sqlx::Error::Io(e)) => {
                tracing::error!("Store connection error: {}", e);
                ApiError::upstream_unavailable("Record store temporarily unavailable")
            }
            crate::database::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::identity::AuthError> for ApiError {
    fn from(err: crate::identity::AuthError) -> Self {
        // Every identity service failure surfaces as Unauthenticated, including
        // an unreachable service: the credential could not be verified.
        match err {
            crate::identity::AuthError::InvalidCredential(msg) => ApiError::unauthenticated(msg),
            crate::identity::AuthError::ServiceUnreachable(msg) => {
                tracing::error!("Identity service unreachable: {}", msg);
                ApiError::unauthenticated("Invalid authentication credentials")
            }
            crate::identity::AuthError::Config(msg) => {
                tracing::error!("Identity service misconfigured: {}", msg);
                ApiError::internal_server_error("Authentication is not available")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::unauthenticated("x").status_code(), 401);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::field_error("price", "negative").status_code(), 400);
        assert_eq!(ApiError::upstream_unavailable("x").status_code(), 503);
    }

    #[test]
    fn unauthenticated_and_forbidden_stay_distinct() {
        assert_ne!(
            ApiError::unauthenticated("x").error_code(),
            ApiError::forbidden("x").error_code()
        );
    }

    #[test]
    fn validation_error_carries_field_errors() {
        let err = ApiError::field_error("price", "Price must be non-negative");
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["price"], "Price must be non-negative");
    }
}
