//! Plan handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use core_kernel::CorrelationId;
use domain_verification::{plan_catalog, InsurancePlan, PlanSelectionView, UserSession};

use crate::error::ApiError;
use crate::handlers::operation_metadata;
use crate::AppState;

/// Lists the plan catalog
pub async fn list_plans() -> Json<Vec<InsurancePlan>> {
    Json(plan_catalog())
}

/// Selects a plan; unverified users get the drawer back
pub async fn select_plan(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    correlation_id: Option<Extension<CorrelationId>>,
    Path(slug): Path<String>,
) -> Result<Json<PlanSelectionView>, ApiError> {
    let metadata = operation_metadata(&session, correlation_id);
    let view = state.service.select_plan(&session, &slug, Some(metadata)).await?;
    Ok(Json(view))
}
