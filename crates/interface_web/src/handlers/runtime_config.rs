//! Client runtime configuration

use axum::{extract::State, Json};
use tracing::warn;

use crate::config::RuntimeConfig;
use crate::error::ApiError;
use crate::AppState;

/// Serves the public client configuration
pub async fn get_runtime_config(
    State(state): State<AppState>,
) -> Result<Json<RuntimeConfig>, ApiError> {
    if state.runtime.client_id().is_none() {
        warn!("Runtime configuration requested without a client ID");
        return Err(ApiError::MissingClientId);
    }
    Ok(Json(state.runtime.as_ref().clone()))
}
