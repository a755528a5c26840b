//! Verification domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by the verification service
#[derive(Debug, Error)]
pub enum VerificationError {
    /// No identity verification provider is configured
    #[error("Identity verification provider ID is not configured")]
    MissingProviderId,

    /// The initiation response carried no SDK token for the widget
    #[error("Token not found in the init response from the Onfido server")]
    MissingSdkToken,

    /// The identity server call failed
    #[error("Identity verification request failed: {0}")]
    Remote(#[from] PortError),

    /// The selected plan does not exist
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),
}

impl VerificationError {
    /// Text carried to the generic error page
    pub fn user_message(&self) -> String {
        match self {
            VerificationError::MissingProviderId => {
                "Identity Verification Provider ID Required. Add the identityVerificationProviderId \
                 value to the runtime configuration."
                    .to_string()
            }
            VerificationError::MissingSdkToken => self.to_string(),
            VerificationError::Remote(err) => err.to_string(),
            VerificationError::UnknownPlan(_) => self.to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VerificationError::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_message_matches_widget_expectation() {
        assert_eq!(
            VerificationError::MissingSdkToken.user_message(),
            "Token not found in the init response from the Onfido server"
        );
    }

    #[test]
    fn test_remote_error_from_port_error() {
        let err: VerificationError = PortError::connection("refused").into();
        assert!(err.is_remote());
        assert!(err.user_message().contains("refused"));
    }
}
