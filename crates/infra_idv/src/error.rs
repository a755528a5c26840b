//! Error mapping for identity server responses
//!
//! HTTP failures are mapped to `PortError` variants:
//! - 400 -> `PortError::Validation`
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connection failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use core_kernel::PortError;

const SERVICE_NAME: &str = "identity server";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Errors raised while building the adapter
#[derive(Debug, Error)]
pub enum IdvClientError {
    #[error("Invalid identity server URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Identity server URL cannot carry a path: {0}")]
    UnsupportedBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Error body returned by the identity server's REST APIs
#[derive(Debug, Default, Deserialize)]
struct IdentityServerErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Best human-readable text in an error body
fn error_text(status: StatusCode, body: &str) -> String {
    let parsed: IdentityServerErrorBody = serde_json::from_str(body).unwrap_or_default();
    let text = parsed
        .description
        .filter(|d| !d.is_empty())
        .or(parsed.message.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    match parsed.code {
        Some(code) => format!("{} ({})", text, code),
        None => text,
    }
}

/// Maps a non-success response onto a port error
pub fn map_status(
    operation: &str,
    status: StatusCode,
    retry_after_secs: Option<u64>,
    body: &str,
) -> PortError {
    let text = error_text(status, body);
    match status {
        StatusCode::BAD_REQUEST => PortError::validation(text),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::unauthorized(text),
        StatusCode::NOT_FOUND => PortError::not_found(operation, text),
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("{} returned {}", SERVICE_NAME, s.as_u16()),
        },
        s => PortError::internal(format!("{} failed with status {}: {}", operation, s.as_u16(), text)),
    }
}

/// Maps a transport failure onto a port error
pub fn map_transport_error(operation: &str, timeout_ms: u64, err: reqwest::Error) -> PortError {
    if err.is_timeout() {
        PortError::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout_ms,
        }
    } else if err.is_decode() {
        PortError::transformation(format!("{}: {}", operation, err))
    } else {
        PortError::Connection {
            message: format!("{} could not reach the {}", operation, SERVICE_NAME),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_are_unauthorized() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = map_status("get_claims", status, None, "");
            assert!(matches!(err, PortError::Unauthorized { .. }));
        }
    }

    #[test]
    fn test_server_errors_are_transient() {
        let err = map_status("verify", StatusCode::BAD_GATEWAY, None, "<html>");
        assert!(matches!(err, PortError::ServiceUnavailable { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_rate_limit_uses_retry_after() {
        let err = map_status("verify", StatusCode::TOO_MANY_REQUESTS, Some(7), "");
        assert!(matches!(err, PortError::RateLimited { retry_after_secs: 7 }));

        let err = map_status("verify", StatusCode::TOO_MANY_REQUESTS, None, "");
        assert!(matches!(err, PortError::RateLimited { retry_after_secs: 60 }));
    }

    #[test]
    fn test_error_body_description_is_surfaced() {
        let body = r#"{"code":"IDV-60001","message":"Bad request","description":"Verification already initiated"}"#;
        let err = map_status("verify", StatusCode::BAD_REQUEST, None, body);
        match err {
            PortError::Validation { message, .. } => {
                assert_eq!(message, "Verification already initiated (IDV-60001)");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_and_unexpected_status() {
        assert!(map_status("get_claims", StatusCode::NOT_FOUND, None, "").is_not_found());

        let err = map_status("get_claims", StatusCode::IM_A_TEAPOT, None, "");
        assert!(matches!(err, PortError::Internal { .. }));
    }
}
