//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_verification::VerificationError;

use crate::auth::AuthError;

/// Shown when the runtime configuration has no client id
pub const MISSING_CLIENT_ID_MESSAGE: &str =
    "Client ID Required. Add the clientID value of the application registered in the identity \
     server to the runtime configuration.";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Client ID is not configured")]
    MissingClientId,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::MissingClientId => (
                StatusCode::SERVICE_UNAVAILABLE,
                "missing_client_id",
                MISSING_CLIENT_ID_MESSAGE.to_string(),
            ),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone())
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".to_string())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::UnknownPlan(slug) => ApiError::NotFound(format!("Plan '{}' not found", slug)),
            VerificationError::MissingProviderId => ApiError::ServiceUnavailable(err.user_message()),
            VerificationError::MissingSdkToken => ApiError::Upstream(err.user_message()),
            VerificationError::Remote(PortError::Unauthorized { message }) => ApiError::Unauthorized(message),
            VerificationError::Remote(port) => ApiError::Upstream(port.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::MissingClientId, StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_verification_error_mapping() {
        assert!(matches!(
            ApiError::from(VerificationError::UnknownPlan("gold".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(VerificationError::Remote(PortError::unauthorized("expired"))),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(VerificationError::Remote(PortError::connection("refused"))),
            ApiError::Upstream(_)
        ));
    }
}
