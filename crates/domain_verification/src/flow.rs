//! Verification flow requests
//!
//! The identity server's `/me/idv/verify` endpoint drives the provider-side
//! flow. The requested transition travels as a `status` property.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::claim::{VerificationClaim, DOB_CLAIM_URI, GIVEN_NAME_CLAIM_URI, LAST_NAME_CLAIM_URI};

/// Property key carrying the SDK flow status
pub const STATUS_PROPERTY: &str = "status";

/// Status of the document-capture SDK flow, as reported by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SdkFlowStatus {
    /// First start; creates the applicant and a workflow run
    Initiated,
    /// Widget finished; the identity server refreshes the workflow status
    Completed,
    /// Resume after an interrupted (awaiting_input) run
    Reinitiated,
}

impl SdkFlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkFlowStatus::Initiated => "INITIATED",
            SdkFlowStatus::Completed => "COMPLETED",
            SdkFlowStatus::Reinitiated => "REINITIATED",
        }
    }
}

impl fmt::Display for SdkFlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value property of a verify request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdVProperty {
    pub key: String,
    pub value: String,
}

/// Body of `POST /api/users/v1/me/idv/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(rename = "idVProviderId")]
    pub idv_provider_id: String,
    pub claims: Vec<String>,
    pub properties: Vec<IdVProperty>,
}

impl VerifyRequest {
    /// Builds a request moving the flow to `status` for the given claims
    pub fn new(idv_provider_id: impl Into<String>, claims: Vec<String>, status: SdkFlowStatus) -> Self {
        Self {
            idv_provider_id: idv_provider_id.into(),
            claims,
            properties: vec![IdVProperty {
                key: STATUS_PROPERTY.to_string(),
                value: status.as_str().to_string(),
            }],
        }
    }

    /// Default set of claims submitted for age verification
    pub fn age_verification_claims() -> Vec<String> {
        vec![
            DOB_CLAIM_URI.to_string(),
            GIVEN_NAME_CLAIM_URI.to_string(),
            LAST_NAME_CLAIM_URI.to_string(),
        ]
    }

    /// Returns the requested flow status, if the status property is present
    pub fn flow_status(&self) -> Option<SdkFlowStatus> {
        self.properties
            .iter()
            .find(|p| p.key == STATUS_PROPERTY)
            .and_then(|p| match p.value.as_str() {
                "INITIATED" => Some(SdkFlowStatus::Initiated),
                "COMPLETED" => Some(SdkFlowStatus::Completed),
                "REINITIATED" => Some(SdkFlowStatus::Reinitiated),
                _ => None,
            })
    }
}

/// Response of the verify endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdVResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub claims: Vec<VerificationClaim>,
}

impl IdVResponse {
    /// SDK token for the widget; the identity server attaches it to the first claim
    pub fn sdk_token(&self) -> Option<&str> {
        self.claims
            .first()
            .and_then(|claim| claim.claim_metadata.sdk_token.as_deref())
            .filter(|token| !token.is_empty())
    }

    /// Workflow run started by the initiation, if reported
    pub fn workflow_run_id(&self) -> Option<&str> {
        self.claims
            .first()
            .and_then(|claim| claim.claim_metadata.onfido_workflow_run_id.as_deref())
    }
}
