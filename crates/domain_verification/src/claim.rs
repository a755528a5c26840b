//! Identity verification claims
//!
//! A claim is a user attribute (date of birth, given name, ...) annotated by
//! the identity server with the state of the provider-side verification
//! workflow. Claims are read-only snapshots fetched per request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Date of birth claim; the attribute whose verification gates plan selection
pub const DOB_CLAIM_URI: &str = "http://wso2.org/claims/dob";
/// Given name claim, submitted alongside the date of birth
pub const GIVEN_NAME_CLAIM_URI: &str = "http://wso2.org/claims/givenname";
/// Last name claim, submitted alongside the date of birth
pub const LAST_NAME_CLAIM_URI: &str = "http://wso2.org/claims/lastname";

/// Provider-reported stage of the asynchronous verification workflow
///
/// Values outside the known set are preserved as [`WorkflowStatus::Unknown`]
/// rather than failing deserialization, so an unexpected provider value
/// degrades to a "contact support" message instead of an error page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Processing,
    AwaitingInput,
    Approved,
    Declined,
    Review,
    Abandoned,
    Error,
    Unknown(String),
}

impl WorkflowStatus {
    /// Returns the wire representation
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::Processing => "processing",
            WorkflowStatus::AwaitingInput => "awaiting_input",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Declined => "declined",
            WorkflowStatus::Review => "review",
            WorkflowStatus::Abandoned => "abandoned",
            WorkflowStatus::Error => "error",
            WorkflowStatus::Unknown(raw) => raw,
        }
    }

    /// Returns true for values the provider is known to emit
    pub fn is_known(&self) -> bool {
        !matches!(self, WorkflowStatus::Unknown(_))
    }
}

impl From<String> for WorkflowStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "processing" => WorkflowStatus::Processing,
            "awaiting_input" => WorkflowStatus::AwaitingInput,
            "approved" => WorkflowStatus::Approved,
            "declined" => WorkflowStatus::Declined,
            "review" => WorkflowStatus::Review,
            "abandoned" => WorkflowStatus::Abandoned,
            "error" => WorkflowStatus::Error,
            _ => WorkflowStatus::Unknown(raw),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(raw: &str) -> Self {
        WorkflowStatus::from(raw.to_string())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> String {
        match status {
            WorkflowStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider bookkeeping attached to a claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onfido_applicant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onfido_workflow_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onfido_workflow_status: Option<WorkflowStatus>,
    /// Only present on the response to a verification initiation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_token: Option<String>,
}

/// A user attribute annotated with verification state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationClaim {
    pub id: String,
    pub uri: String,
    pub is_verified: bool,
    #[serde(default)]
    pub claim_metadata: ClaimMetadata,
}

impl VerificationClaim {
    /// Returns the claim with the given URI, if present
    pub fn find<'a>(claims: &'a [VerificationClaim], uri: &str) -> Option<&'a VerificationClaim> {
        claims.iter().find(|claim| claim.uri == uri)
    }

    /// Returns the workflow status reported for this claim
    pub fn workflow_status(&self) -> Option<&WorkflowStatus> {
        self.claim_metadata.onfido_workflow_status.as_ref()
    }
}

/// Condensed view of a single claim's verification state
///
/// `is_verified == None` means the claim does not exist yet, i.e. the user
/// has never started verification for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerificationStatus {
    pub is_verified: Option<bool>,
    pub workflow_status: Option<WorkflowStatus>,
}

impl ClaimVerificationStatus {
    pub fn from_claim(claim: Option<&VerificationClaim>) -> Self {
        match claim {
            None => Self::default(),
            Some(claim) => Self {
                is_verified: Some(claim.is_verified),
                workflow_status: claim.workflow_status().cloned(),
            },
        }
    }

    /// True only for an existing, verified claim
    pub fn is_verified(&self) -> bool {
        self.is_verified == Some(true)
    }

    /// True when the provider is waiting for the user to resume the flow
    pub fn is_awaiting_input(&self) -> bool {
        self.workflow_status == Some(WorkflowStatus::AwaitingInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_status_parses_known_values() {
        assert_eq!(WorkflowStatus::from("awaiting_input"), WorkflowStatus::AwaitingInput);
        assert_eq!(WorkflowStatus::from("review"), WorkflowStatus::Review);
        assert!(WorkflowStatus::from("approved").is_known());
    }

    #[test]
    fn test_workflow_status_keeps_unknown_values() {
        let status = WorkflowStatus::from("on_hold");
        assert_eq!(status, WorkflowStatus::Unknown("on_hold".to_string()));
        assert_eq!(status.to_string(), "on_hold");
        assert!(!status.is_known());
    }

    #[test]
    fn test_claim_deserializes_identity_server_payload() {
        let payload = json!({
            "id": "7f1c",
            "uri": DOB_CLAIM_URI,
            "isVerified": false,
            "claimMetadata": {
                "onfido_applicant_id": "app-1",
                "onfido_workflow_run_id": "run-1",
                "onfido_workflow_status": "processing"
            }
        });

        let claim: VerificationClaim = serde_json::from_value(payload).unwrap();
        assert_eq!(claim.uri, DOB_CLAIM_URI);
        assert!(!claim.is_verified);
        assert_eq!(claim.workflow_status(), Some(&WorkflowStatus::Processing));
        assert_eq!(claim.claim_metadata.sdk_token, None);
    }

    #[test]
    fn test_claim_without_metadata_defaults() {
        let payload = json!({ "id": "1", "uri": DOB_CLAIM_URI, "isVerified": true });
        let claim: VerificationClaim = serde_json::from_value(payload).unwrap();
        assert_eq!(claim.claim_metadata, ClaimMetadata::default());
    }

    #[test]
    fn test_find_claim_by_uri() {
        let claims = vec![
            VerificationClaim {
                id: "1".to_string(),
                uri: GIVEN_NAME_CLAIM_URI.to_string(),
                is_verified: true,
                claim_metadata: ClaimMetadata::default(),
            },
            VerificationClaim {
                id: "2".to_string(),
                uri: DOB_CLAIM_URI.to_string(),
                is_verified: false,
                claim_metadata: ClaimMetadata::default(),
            },
        ];

        let found = VerificationClaim::find(&claims, DOB_CLAIM_URI).unwrap();
        assert_eq!(found.id, "2");
        assert!(VerificationClaim::find(&claims, LAST_NAME_CLAIM_URI).is_none());
    }

    #[test]
    fn test_status_for_missing_claim() {
        let status = ClaimVerificationStatus::from_claim(None);
        assert_eq!(status.is_verified, None);
        assert!(!status.is_verified());
        assert!(!status.is_awaiting_input());
    }
}
