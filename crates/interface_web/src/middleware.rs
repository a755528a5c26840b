//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{info, warn};

use core_kernel::CorrelationId;
use domain_verification::UserSession;

use crate::auth::{authenticate, bearer_token};
use crate::error::ApiError;
use crate::AppState;

/// Header carrying the request's correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Authentication middleware
///
/// Resolves the bearer token into a [`UserSession`] stored in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let session = bearer_token(header)
        .and_then(|token| {
            authenticate(
                token,
                state.config.jwt_secret.as_deref(),
                state.runtime.client_id(),
            )
        });

    match session {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, uri = %request.uri(), "Authentication failed");
            ApiError::from(e).into_response()
        }
    }
}

/// Audit logging middleware
///
/// Assigns a correlation id (reusing a valid incoming one), echoes it on the
/// response and logs every request.
pub async fn audit_middleware(
    State(_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<UserSession>()
        .map(|s| s.user_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<CorrelationId>().ok())
        .unwrap_or_default();
    request.extensions_mut().insert(correlation_id);

    let start = Instant::now();
    let mut response = next.run(request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        correlation_id = %correlation_id,
        status = response.status().as_u16(),
        duration_ms,
        "API request"
    );

    response
}
