//! Request/response DTOs

use serde::{Deserialize, Serialize};

use core_kernel::HealthCheckResult;

/// Body of `POST /api/v1/verification/start`
#[derive(Debug, Default, Deserialize)]
pub struct StartVerificationRequest {
    /// Resume an interrupted workflow run
    #[serde(default)]
    pub reinitiate: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub identity_server: HealthCheckResult,
}
