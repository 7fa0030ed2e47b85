// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::context::ContextError;
use crate::database::DatabaseError;
use crate::middleware::PolicyError;
use crate::rpc::RpcError;
use crate::services::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
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

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(db_err) => db_err.into(),
            StoreError::Http(http_err) => {
                tracing::error!("Upstream request failed: {}", http_err);
                ApiError::bad_gateway("Upstream service unavailable")
            }
            StoreError::Upstream { service, status } => {
                tracing::error!("Upstream {} responded with {}", service, status);
                ApiError::bad_gateway("Upstream service unavailable")
            }
            StoreError::Decode(msg) => {
                tracing::error!("Upstream payload could not be decoded: {}", msg);
                ApiError::bad_gateway("Upstream service returned an invalid response")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        tracing::error!("Authentication setup error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        // Policy violations abort the request like any other uncaught error
        tracing::warn!("Request rejected by origin policy: {}", err);
        ApiError::internal_server_error("Request rejected")
    }
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::IntegrityViolation(msg) => {
                tracing::error!("Integrity violation while building request context: {}", msg);
                ApiError::internal_server_error("An unexpected error occurred")
            }
            ContextError::CanvasAuthorization => {
                tracing::error!("Authorization context requested for a canvas request");
                ApiError::internal_server_error("An unexpected error occurred")
            }
            ContextError::Auth(auth_err) => auth_err.into(),
            ContextError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Forbidden(msg) => ApiError::forbidden(msg),
            RpcError::Store(store_err) => store_err.into(),
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
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_violation_is_a_server_error() {
        let err: ApiError = ContextError::IntegrityViolation("token without owner".into()).into();
        assert_eq!(err.status_code(), 500);
        // Internal detail never reaches the client
        assert!(!err.message().contains("owner"));
    }

    #[test]
    fn rpc_forbidden_maps_to_403() {
        let err: ApiError = RpcError::Forbidden("not your projects".into()).into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_json()["code"], "FORBIDDEN");
    }

    #[test]
    fn upstream_failure_maps_to_bad_gateway() {
        let err: ApiError = StoreError::Upstream {
            service: "postgrest",
            status: 500,
        }
        .into();
        assert_eq!(err.status_code(), 502);
    }
}
