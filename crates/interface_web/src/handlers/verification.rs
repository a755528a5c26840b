//! Verification handlers

use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};

use core_kernel::CorrelationId;
use domain_verification::{HomeRequest, HomeView, Redirect, UserSession, VerifyPageView};

use crate::dto::StartVerificationRequest;
use crate::error::ApiError;
use crate::handlers::operation_metadata;
use crate::AppState;

/// Home page status check
pub async fn get_status(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    correlation_id: Option<Extension<CorrelationId>>,
    Query(request): Query<HomeRequest>,
) -> Json<HomeView> {
    let metadata = operation_metadata(&session, correlation_id);
    Json(state.service.check_status(&session, &request, Some(metadata)).await)
}

/// Starts or resumes the widget flow
///
/// An empty body starts a fresh run.
pub async fn start_verification(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    correlation_id: Option<Extension<CorrelationId>>,
    body: Bytes,
) -> Result<Json<VerifyPageView>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartVerificationRequest::default()
    } else {
        let Json(request) = Json::<StartVerificationRequest>::from_bytes(&body)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        request
    };

    let metadata = operation_metadata(&session, correlation_id);
    let view = state
        .service
        .start_verification(&session, request.reinitiate, Some(metadata))
        .await;
    Ok(Json(view))
}

/// Marks the widget flow completed
pub async fn complete_verification(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    correlation_id: Option<Extension<CorrelationId>>,
) -> Json<Redirect> {
    let metadata = operation_metadata(&session, correlation_id);
    Json(state.service.complete_verification(&session, Some(metadata)).await)
}
