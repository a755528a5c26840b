//! Identity Verification Port
//!
//! The port through which the domain reaches the identity server's
//! identity-verification (IDV) API. The production adapter lives in
//! `infra_idv`; the mock below backs tests and local demos.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_verification::{IdentityVerificationPort, VerifyRequest, SdkFlowStatus};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn IdentityVerificationPort> = Arc::new(adapter);
//! let claims = port.get_claims(&session, "idvp-1", None).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::claim::VerificationClaim;
use crate::flow::{IdVResponse, VerifyRequest};
use crate::session::UserSession;

/// Operations the domain needs from the identity server
#[async_trait]
pub trait IdentityVerificationPort: DomainPort + HealthCheckable {
    /// Lists the session user's claims known to the given IDV provider
    ///
    /// An empty list is a valid answer: the user has not started
    /// verification yet.
    async fn get_claims(
        &self,
        session: &UserSession,
        idv_provider_id: &str,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<VerificationClaim>, PortError>;

    /// Moves the provider-side flow to the status carried by `request`
    async fn change_verification_status(
        &self,
        session: &UserSession,
        request: &VerifyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<IdVResponse, PortError>;
}

/// Mock implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{HealthCheckResult, UserId};

    use crate::claim::{ClaimMetadata, WorkflowStatus};
    use crate::flow::SdkFlowStatus;

    /// In-memory stand-in for the identity server
    ///
    /// Initiation creates unverified claims awaiting input and returns an SDK
    /// token; completion moves unverified claims to processing, as the
    /// identity server does while the provider works on the result.
    #[derive(Debug, Default)]
    pub struct MockIdentityVerificationPort {
        claims: Arc<RwLock<HashMap<UserId, Vec<VerificationClaim>>>>,
        requests: Arc<RwLock<Vec<(UserId, VerifyRequest)>>>,
        unavailable: AtomicBool,
        omit_sdk_token: AtomicBool,
        sequence: AtomicU64,
    }

    impl MockIdentityVerificationPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Replaces the claims held for a user
        pub async fn set_claims(&self, user: &UserId, claims: Vec<VerificationClaim>) {
            self.claims.write().await.insert(user.clone(), claims);
        }

        /// Simulates the provider's verdict arriving for all of a user's claims
        pub async fn mark_verified(&self, user: &UserId) {
            if let Some(claims) = self.claims.write().await.get_mut(user) {
                for claim in claims.iter_mut() {
                    claim.is_verified = true;
                    claim.claim_metadata.onfido_workflow_status = Some(WorkflowStatus::Approved);
                }
            }
        }

        /// Makes every call fail with a connection error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Drops the SDK token from initiation responses
        pub fn set_omit_sdk_token(&self, omit: bool) {
            self.omit_sdk_token.store(omit, Ordering::SeqCst);
        }

        /// Verify requests received so far
        pub async fn recorded_requests(&self) -> Vec<(UserId, VerifyRequest)> {
            self.requests.read().await.clone()
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock identity server is unavailable"));
            }
            Ok(())
        }

        fn next_id(&self, prefix: &str) -> String {
            format!("{}-{}", prefix, self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
        }

        async fn initiate(
            &self,
            user: &UserId,
            request: &VerifyRequest,
            resume: bool,
        ) -> Result<IdVResponse, PortError> {
            let mut all = self.claims.write().await;
            let existing = all.entry(user.clone()).or_default();

            let in_flight = existing
                .iter()
                .any(|c| !c.is_verified && c.claim_metadata.onfido_applicant_id.is_some());
            if in_flight && !resume {
                return Err(PortError::validation("Verification already initiated"));
            }

            let applicant_id = existing
                .iter()
                .find_map(|c| c.claim_metadata.onfido_applicant_id.clone())
                .unwrap_or_else(|| self.next_id("applicant"));
            let run_id = self.next_id("run");

            let mut issued = Vec::with_capacity(request.claims.len());
            for uri in &request.claims {
                let metadata = ClaimMetadata {
                    onfido_applicant_id: Some(applicant_id.clone()),
                    onfido_workflow_run_id: Some(run_id.clone()),
                    onfido_workflow_status: Some(WorkflowStatus::AwaitingInput),
                    sdk_token: None,
                };
                match existing.iter_mut().find(|c| &c.uri == uri) {
                    Some(claim) => {
                        claim.is_verified = false;
                        claim.claim_metadata = metadata;
                        issued.push(claim.clone());
                    }
                    None => {
                        let claim = VerificationClaim {
                            id: self.next_id("claim"),
                            uri: uri.clone(),
                            is_verified: false,
                            claim_metadata: metadata,
                        };
                        existing.push(claim.clone());
                        issued.push(claim);
                    }
                }
            }

            if !self.omit_sdk_token.load(Ordering::SeqCst) {
                let token = self.next_id("sdk-token");
                for claim in issued.iter_mut() {
                    claim.claim_metadata.sdk_token = Some(token.clone());
                }
            }

            Ok(IdVResponse {
                id: user.to_string(),
                claims: issued,
            })
        }

        async fn complete(&self, user: &UserId, request: &VerifyRequest) -> IdVResponse {
            let mut all = self.claims.write().await;
            let mut updated = Vec::new();
            if let Some(existing) = all.get_mut(user) {
                for claim in existing
                    .iter_mut()
                    .filter(|c| !c.is_verified && request.claims.contains(&c.uri))
                {
                    claim.claim_metadata.onfido_workflow_status = Some(WorkflowStatus::Processing);
                    updated.push(claim.clone());
                }
            }
            IdVResponse {
                id: user.to_string(),
                claims: updated,
            }
        }
    }

    impl DomainPort for MockIdentityVerificationPort {}

    #[async_trait]
    impl HealthCheckable for MockIdentityVerificationPort {
        async fn health_check(&self) -> HealthCheckResult {
            if self.unavailable.load(Ordering::SeqCst) {
                HealthCheckResult::unhealthy("mock-idv-port", "marked unavailable")
            } else {
                HealthCheckResult::healthy("mock-idv-port")
            }
        }
    }

    #[async_trait]
    impl IdentityVerificationPort for MockIdentityVerificationPort {
        async fn get_claims(
            &self,
            session: &UserSession,
            _idv_provider_id: &str,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<VerificationClaim>, PortError> {
            self.check_available()?;
            Ok(self
                .claims
                .read()
                .await
                .get(&session.user_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn change_verification_status(
            &self,
            session: &UserSession,
            request: &VerifyRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<IdVResponse, PortError> {
            self.check_available()?;
            self.requests
                .write()
                .await
                .push((session.user_id.clone(), request.clone()));

            match request.flow_status() {
                Some(SdkFlowStatus::Initiated) => self.initiate(&session.user_id, request, false).await,
                Some(SdkFlowStatus::Reinitiated) => self.initiate(&session.user_id, request, true).await,
                Some(SdkFlowStatus::Completed) => Ok(self.complete(&session.user_id, request).await),
                None => Err(PortError::validation_field(
                    "Verification status is not defined in the request",
                    "properties",
                )),
            }
        }
    }
}
