//! Verification status resolution
//!
//! Maps the monitored claim onto a [`UiDirective`]. Precedence:
//!
//! 1. no claim: ask the user to verify
//! 2. verified: stay quiet, except for a one-time success notice
//! 3. unverified: dispatch on the provider's workflow status
//!
//! The resolver is a pure function of its inputs. Reading and recording the
//! one-time notice flag is left to the caller, which owns the store.

use crate::claim::{VerificationClaim, WorkflowStatus, DOB_CLAIM_URI};
use crate::directive::{DrawerMessage, UiDirective};

/// Outcome of resolving a claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub directive: UiDirective,
    /// The success notice is being shown now and must be recorded as shown
    pub record_success_notice: bool,
}

/// Resolves the claim for a monitored attribute into a drawer directive
#[derive(Debug, Clone)]
pub struct VerificationStatusResolver {
    monitored_claim_uri: String,
}

impl Default for VerificationStatusResolver {
    fn default() -> Self {
        Self::new(DOB_CLAIM_URI)
    }
}

impl VerificationStatusResolver {
    pub fn new(monitored_claim_uri: impl Into<String>) -> Self {
        Self {
            monitored_claim_uri: monitored_claim_uri.into(),
        }
    }

    /// Picks the monitored claim out of the user's claims
    pub fn select<'a>(&self, claims: &'a [VerificationClaim]) -> Option<&'a VerificationClaim> {
        VerificationClaim::find(claims, &self.monitored_claim_uri)
    }

    /// Resolves a claim snapshot
    ///
    /// `success_notice_shown` tells whether this user has already seen the
    /// success notice.
    pub fn resolve(&self, claim: Option<&VerificationClaim>, success_notice_shown: bool) -> Resolution {
        let Some(claim) = claim else {
            return Resolution {
                directive: UiDirective::drawer(DrawerMessage::VerificationRequired),
                record_success_notice: false,
            };
        };

        if claim.is_verified {
            return if success_notice_shown {
                Resolution {
                    directive: UiDirective::hidden(),
                    record_success_notice: false,
                }
            } else {
                Resolution {
                    directive: UiDirective::drawer(DrawerMessage::VerificationSucceeded),
                    record_success_notice: true,
                }
            };
        }

        Resolution {
            directive: UiDirective::drawer(Self::message_for(claim.workflow_status())),
            record_success_notice: false,
        }
    }

    /// Drawer message for an unverified claim
    ///
    /// `approved` on an unverified claim is grouped with the terminal
    /// failures: the claim's `is_verified` flag is the source of truth, and an
    /// approved run that has not flipped it is treated as failed.
    pub fn message_for(status: Option<&WorkflowStatus>) -> DrawerMessage {
        match status {
            Some(WorkflowStatus::AwaitingInput) => DrawerMessage::ResumeVerification,
            Some(WorkflowStatus::Processing) => DrawerMessage::InProgress,
            Some(WorkflowStatus::Approved)
            | Some(WorkflowStatus::Declined)
            | Some(WorkflowStatus::Abandoned) => DrawerMessage::VerificationFailed,
            Some(WorkflowStatus::Review) => DrawerMessage::UnderReview,
            Some(WorkflowStatus::Error) => DrawerMessage::ProviderError,
            Some(WorkflowStatus::Unknown(_)) | None => DrawerMessage::StatusUnclear,
        }
    }
}
