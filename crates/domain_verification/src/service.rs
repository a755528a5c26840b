//! Verification Service
//!
//! Orchestrates the page-level flows of the shopping UI on top of the IDV
//! port, the notice store and the resolver:
//!
//! - home status check ([`VerificationService::check_status`])
//! - starting or resuming the widget flow ([`VerificationService::start_verification`])
//! - completing the widget flow ([`VerificationService::complete_verification`])
//! - plan selection ([`VerificationService::select_plan`])
//!
//! Remote failures never escape as errors; they become redirects to the
//! generic error page, mirroring how the UI recovers by navigation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use core_kernel::{HealthCheckResult, OperationMetadata};

use crate::claim::{ClaimVerificationStatus, VerificationClaim, DOB_CLAIM_URI};
use crate::directive::UiDirective;
use crate::error::VerificationError;
use crate::flow::{SdkFlowStatus, VerifyRequest};
use crate::navigation::{Redirect, Route};
use crate::notice::{NoticeKey, SuccessNoticeStore};
use crate::plans::{find_plan, plan_catalog, InsurancePlan};
use crate::ports::IdentityVerificationPort;
use crate::resolver::VerificationStatusResolver;
use crate::session::UserSession;

/// Shown on the generic error page when the status lookup fails
pub const STATUS_CHECK_FAILED_MESSAGE: &str =
    "An error occurred while verifying your age. Please try again later or contact support.";

/// `error_description` sent back by the identity server when the user
/// declines the logout consent prompt
pub const USER_DENIED_LOGOUT_DESCRIPTION: &str = "End User denied the logout request";

/// Shown when the user declined to log out
pub const USER_DENIED_LOGOUT_MESSAGE: &str =
    "You denied the logout request. Log out again to switch accounts, or continue to the plans.";

/// Guidance returned when no IDV provider is configured
pub const MISSING_PROVIDER_ID_MESSAGE: &str =
    "Identity Verification Provider ID Required. Add the identityVerificationProviderId value \
     with the configured Onfido identity verification provider's ID to the runtime configuration.";

const WIDGET_STEPS: [&str; 4] = ["welcome", "document", "face", "complete"];
const WIDGET_WELCOME_TITLE: &str = "Verify your age";

/// Service settings derived from the runtime configuration
#[derive(Debug, Clone)]
pub struct VerificationSettings {
    /// IDV provider registered in the identity server
    pub idv_provider_id: Option<String>,
    /// Claims submitted when a verification starts
    pub claims_to_verify: Vec<String>,
    /// Claim whose status drives the drawer
    pub monitored_claim_uri: String,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            idv_provider_id: None,
            claims_to_verify: VerifyRequest::age_verification_claims(),
            monitored_claim_uri: DOB_CLAIM_URI.to_string(),
        }
    }
}

impl VerificationSettings {
    pub fn with_provider(idv_provider_id: impl Into<String>) -> Self {
        Self {
            idv_provider_id: Some(idv_provider_id.into()),
            ..Default::default()
        }
    }
}

/// Navigation context of a home page load
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeRequest {
    /// Set when returning from a completed widget flow
    #[serde(default)]
    pub verification_initiated: bool,
    /// OIDC `state` echoed back by the identity server
    #[serde(default)]
    pub state: Option<String>,
    /// OIDC `error_description` echoed back by the identity server
    #[serde(default)]
    pub error_description: Option<String>,
}

impl HomeRequest {
    fn logout_denied(&self) -> bool {
        self.state.is_some()
            && self.error_description.as_deref() == Some(USER_DENIED_LOGOUT_DESCRIPTION)
    }
}

/// Drawer state plus everything the home page renders with it
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub directive: UiDirective,
    pub status: ClaimVerificationStatus,
    pub age_verified: bool,
    /// Where the "Verify Age" action leads
    pub verify_action: Redirect,
    pub plans: Vec<InsurancePlan>,
}

/// Result of a home page load
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum HomeView {
    Redirect(Redirect),
    MissingProviderId { message: String },
    LogoutDenied { message: String },
    Status(StatusView),
}

/// Configuration handed to the document-capture widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetSession {
    pub sdk_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_run_id: Option<String>,
    pub use_modal: bool,
    pub welcome_title: &'static str,
    pub steps: Vec<&'static str>,
}

/// Result of opening the verify page
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum VerifyPageView {
    Widget(WidgetSession),
    Redirect(Redirect),
}

/// Result of selecting a plan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PlanSelectionView {
    Redirect(Redirect),
    Drawer(UiDirective),
}

/// Page-level verification flows
pub struct VerificationService {
    idv: Arc<dyn IdentityVerificationPort>,
    notices: Arc<dyn SuccessNoticeStore>,
    resolver: VerificationStatusResolver,
    settings: VerificationSettings,
}

impl VerificationService {
    pub fn new(
        idv: Arc<dyn IdentityVerificationPort>,
        notices: Arc<dyn SuccessNoticeStore>,
        settings: VerificationSettings,
    ) -> Self {
        let resolver = VerificationStatusResolver::new(settings.monitored_claim_uri.clone());
        Self {
            idv,
            notices,
            resolver,
            settings,
        }
    }

    /// Health of the identity server connection
    pub async fn health(&self) -> HealthCheckResult {
        self.idv.health_check().await
    }

    fn provider_id(&self) -> Result<&str, VerificationError> {
        self.settings
            .idv_provider_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(VerificationError::MissingProviderId)
    }

    async fn fetch_monitored_claim(
        &self,
        session: &UserSession,
        metadata: Option<OperationMetadata>,
    ) -> Result<Option<VerificationClaim>, VerificationError> {
        let provider_id = self.provider_id()?;
        let claims = self.idv.get_claims(session, provider_id, metadata).await?;
        let claim = self.resolver.select(&claims).cloned();
        debug!(
            user = %session.user_id,
            found = claim.is_some(),
            claim_count = claims.len(),
            "Fetched verification claims"
        );
        Ok(claim)
    }

    /// A store that cannot be read suppresses the notice rather than failing
    /// the page.
    async fn notice_shown(&self, key: &NoticeKey) -> bool {
        match self.notices.is_shown(key).await {
            Ok(shown) => shown,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read success notice flag");
                true
            }
        }
    }

    async fn record_notice(&self, key: &NoticeKey) {
        if let Err(e) = self.notices.mark_shown(key).await {
            warn!(key = %key, error = %e, "Failed to record success notice flag");
        }
    }

    /// Home page status check
    pub async fn check_status(
        &self,
        session: &UserSession,
        request: &HomeRequest,
        metadata: Option<OperationMetadata>,
    ) -> HomeView {
        if request.logout_denied() {
            return HomeView::LogoutDenied {
                message: USER_DENIED_LOGOUT_MESSAGE.to_string(),
            };
        }

        if request.verification_initiated {
            return HomeView::Redirect(Redirect::to(Route::VerificationInProgress));
        }

        let claim = match self.fetch_monitored_claim(session, metadata).await {
            Ok(claim) => claim,
            Err(VerificationError::MissingProviderId) => {
                warn!("Identity verification provider ID is not configured");
                return HomeView::MissingProviderId {
                    message: MISSING_PROVIDER_ID_MESSAGE.to_string(),
                };
            }
            Err(e) => {
                warn!(user = %session.user_id, error = %e, "Verification status check failed");
                return HomeView::Redirect(Redirect::generic_error(STATUS_CHECK_FAILED_MESSAGE));
            }
        };

        let key = NoticeKey::for_user(&session.user_id);
        // The flag only matters for verified claims.
        let shown = match &claim {
            Some(c) if c.is_verified => self.notice_shown(&key).await,
            _ => true,
        };

        let resolution = self.resolver.resolve(claim.as_ref(), shown);
        if resolution.record_success_notice {
            self.record_notice(&key).await;
        }

        let status = ClaimVerificationStatus::from_claim(claim.as_ref());
        info!(
            user = %session.user_id,
            verified = ?status.is_verified,
            workflow_status = ?status.workflow_status.as_ref().map(|s| s.as_str()),
            drawer_open = resolution.directive.drawer_open,
            "Resolved verification status"
        );

        HomeView::Status(StatusView {
            directive: resolution.directive,
            age_verified: status.is_verified(),
            verify_action: Redirect::verify(status.is_awaiting_input()),
            status,
            plans: plan_catalog(),
        })
    }

    /// Starts (or resumes) the provider flow and returns the widget session
    pub async fn start_verification(
        &self,
        session: &UserSession,
        reinitiate: bool,
        metadata: Option<OperationMetadata>,
    ) -> VerifyPageView {
        let flow_status = if reinitiate {
            SdkFlowStatus::Reinitiated
        } else {
            SdkFlowStatus::Initiated
        };

        match self.change_status(session, flow_status, metadata).await {
            Ok(response) => match response.sdk_token() {
                Some(token) => {
                    info!(user = %session.user_id, flow_status = %flow_status, "Verification started");
                    VerifyPageView::Widget(WidgetSession {
                        sdk_token: token.to_string(),
                        workflow_run_id: response.workflow_run_id().map(str::to_string),
                        use_modal: false,
                        welcome_title: WIDGET_WELCOME_TITLE,
                        steps: WIDGET_STEPS.to_vec(),
                    })
                }
                None => {
                    warn!(user = %session.user_id, response_id = %response.id, "Token not found in init response");
                    VerifyPageView::Redirect(Redirect::generic_error(
                        VerificationError::MissingSdkToken.user_message(),
                    ))
                }
            },
            Err(e) => {
                warn!(user = %session.user_id, error = %e, "Failed to start verification");
                VerifyPageView::Redirect(Redirect::generic_error(e.user_message()))
            }
        }
    }

    /// Marks the widget flow completed and sends the user home, where the
    /// in-progress page takes over
    pub async fn complete_verification(
        &self,
        session: &UserSession,
        metadata: Option<OperationMetadata>,
    ) -> Redirect {
        match self.change_status(session, SdkFlowStatus::Completed, metadata).await {
            Ok(_) => {
                info!(user = %session.user_id, "Verification completed");
                Redirect::home_after_verification()
            }
            Err(e) => {
                warn!(user = %session.user_id, error = %e, "Failed to complete verification");
                Redirect::generic_error(e.user_message())
            }
        }
    }

    /// Plan selection; verified users proceed to the success page, everyone
    /// else gets the drawer back
    pub async fn select_plan(
        &self,
        session: &UserSession,
        slug: &str,
        metadata: Option<OperationMetadata>,
    ) -> Result<PlanSelectionView, VerificationError> {
        let plan = find_plan(slug).ok_or_else(|| VerificationError::UnknownPlan(slug.to_string()))?;

        let claim = match self.fetch_monitored_claim(session, metadata).await {
            Ok(claim) => claim,
            Err(e) => {
                warn!(user = %session.user_id, plan = plan.slug, error = %e, "Plan selection status check failed");
                let message = match e {
                    VerificationError::MissingProviderId => MISSING_PROVIDER_ID_MESSAGE.to_string(),
                    _ => STATUS_CHECK_FAILED_MESSAGE.to_string(),
                };
                return Ok(PlanSelectionView::Redirect(Redirect::generic_error(message)));
            }
        };

        if ClaimVerificationStatus::from_claim(claim.as_ref()).is_verified() {
            info!(user = %session.user_id, plan = plan.slug, "Plan selected");
            return Ok(PlanSelectionView::Redirect(Redirect::success(plan.title)));
        }

        let resolution = self.resolver.resolve(claim.as_ref(), true);
        Ok(PlanSelectionView::Drawer(resolution.directive.reopened()))
    }

    async fn change_status(
        &self,
        session: &UserSession,
        flow_status: SdkFlowStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<crate::flow::IdVResponse, VerificationError> {
        let provider_id = self.provider_id()?;
        let request = VerifyRequest::new(
            provider_id,
            self.settings.claims_to_verify.clone(),
            flow_status,
        );
        Ok(self
            .idv
            .change_verification_status(session, &request, metadata)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::InMemoryNoticeStore;
    use crate::ports::mock::MockIdentityVerificationPort;
    use core_kernel::UserId;

    fn session() -> UserSession {
        UserSession::new(UserId::new("alice").unwrap(), "token")
    }

    fn service(port: Arc<MockIdentityVerificationPort>) -> VerificationService {
        VerificationService::new(
            port,
            Arc::new(InMemoryNoticeStore::new()),
            VerificationSettings::with_provider("idvp-1"),
        )
    }

    #[tokio::test]
    async fn test_logout_denied_takes_precedence() {
        let svc = service(Arc::new(MockIdentityVerificationPort::new()));
        let request = HomeRequest {
            verification_initiated: true,
            state: Some("sign_out".to_string()),
            error_description: Some(USER_DENIED_LOGOUT_DESCRIPTION.to_string()),
        };

        let view = svc.check_status(&session(), &request, None).await;
        assert!(matches!(view, HomeView::LogoutDenied { .. }));
    }

    #[tokio::test]
    async fn test_other_error_description_is_ignored() {
        let svc = service(Arc::new(MockIdentityVerificationPort::new()));
        let request = HomeRequest {
            state: Some("sign_in".to_string()),
            error_description: Some("login_required".to_string()),
            ..Default::default()
        };

        let view = svc.check_status(&session(), &request, None).await;
        assert!(matches!(view, HomeView::Status(_)));
    }

    #[tokio::test]
    async fn test_missing_provider_id() {
        let svc = VerificationService::new(
            Arc::new(MockIdentityVerificationPort::new()),
            Arc::new(InMemoryNoticeStore::new()),
            VerificationSettings::default(),
        );

        let view = svc.check_status(&session(), &HomeRequest::default(), None).await;
        assert!(matches!(view, HomeView::MissingProviderId { .. }));

        match svc.start_verification(&session(), false, None).await {
            VerifyPageView::Redirect(redirect) => assert_eq!(redirect.to, Route::GenericError),
            other => panic!("Expected redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_verification_journey() {
        let port = Arc::new(MockIdentityVerificationPort::new());
        let svc = service(port.clone());
        let user = session();

        // No claim yet
        let HomeView::Status(view) = svc.check_status(&user, &HomeRequest::default(), None).await else {
            panic!("Expected status view");
        };
        assert_eq!(view.directive.message, Some(crate::DrawerMessage::VerificationRequired));
        assert_eq!(view.verify_action, Redirect::verify(false));
        assert!(!view.age_verified);
        assert_eq!(view.plans.len(), 3);

        // Start the widget
        let VerifyPageView::Widget(widget) = svc.start_verification(&user, false, None).await else {
            panic!("Expected widget session");
        };
        assert!(widget.sdk_token.starts_with("sdk-token-"));
        assert!(widget.workflow_run_id.is_some());
        assert!(!widget.use_modal);

        // Interrupted run offers a resume
        let HomeView::Status(view) = svc.check_status(&user, &HomeRequest::default(), None).await else {
            panic!("Expected status view");
        };
        assert_eq!(view.directive.message, Some(crate::DrawerMessage::ResumeVerification));
        assert_eq!(view.verify_action, Redirect::verify(true));

        // Widget completes
        let redirect = svc.complete_verification(&user, None).await;
        assert_eq!(redirect, Redirect::home_after_verification());

        let returning = HomeRequest {
            verification_initiated: true,
            ..Default::default()
        };
        match svc.check_status(&user, &returning, None).await {
            HomeView::Redirect(r) => assert_eq!(r.to, Route::VerificationInProgress),
            other => panic!("Expected redirect, got {:?}", other),
        }

        let HomeView::Status(view) = svc.check_status(&user, &HomeRequest::default(), None).await else {
            panic!("Expected status view");
        };
        assert_eq!(view.directive.message, Some(crate::DrawerMessage::InProgress));

        // Provider approves: success notice exactly once
        port.mark_verified(&user.user_id).await;

        let HomeView::Status(first) = svc.check_status(&user, &HomeRequest::default(), None).await else {
            panic!("Expected status view");
        };
        assert_eq!(first.directive.message, Some(crate::DrawerMessage::VerificationSucceeded));
        assert!(first.age_verified);

        let HomeView::Status(second) = svc.check_status(&user, &HomeRequest::default(), None).await else {
            panic!("Expected status view");
        };
        assert!(!second.directive.drawer_open);

        let selection = svc.select_plan(&user, "wealth", None).await.unwrap();
        match selection {
            PlanSelectionView::Redirect(r) => {
                assert_eq!(r.to, Route::Success);
                assert_eq!(r.state.plan.as_deref(), Some("Wealth Plan"));
            }
            other => panic!("Expected redirect, got {:?}", other),
        }

        let statuses: Vec<_> = port
            .recorded_requests()
            .await
            .into_iter()
            .filter_map(|(_, request)| request.flow_status())
            .collect();
        assert_eq!(statuses, vec![SdkFlowStatus::Initiated, SdkFlowStatus::Completed]);
    }

    #[tokio::test]
    async fn test_resume_sends_reinitiated() {
        let port = Arc::new(MockIdentityVerificationPort::new());
        let svc = service(port.clone());

        svc.start_verification(&session(), false, None).await;
        let view = svc.start_verification(&session(), true, None).await;
        assert!(matches!(view, VerifyPageView::Widget(_)));

        let last = port.recorded_requests().await.pop().unwrap().1;
        assert_eq!(last.flow_status(), Some(SdkFlowStatus::Reinitiated));
    }

    #[tokio::test]
    async fn test_missing_sdk_token_redirects_with_message() {
        let port = Arc::new(MockIdentityVerificationPort::new());
        port.set_omit_sdk_token(true);
        let svc = service(port);

        match svc.start_verification(&session(), false, None).await {
            VerifyPageView::Redirect(r) => {
                assert_eq!(r.to, Route::GenericError);
                assert_eq!(
                    r.message(),
                    Some("Token not found in the init response from the Onfido server")
                );
            }
            other => panic!("Expected redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_failure_redirects_to_generic_error() {
        let port = Arc::new(MockIdentityVerificationPort::new());
        port.set_unavailable(true);
        let svc = service(port);

        match svc.check_status(&session(), &HomeRequest::default(), None).await {
            HomeView::Redirect(r) => {
                assert_eq!(r.to, Route::GenericError);
                assert_eq!(r.message(), Some(STATUS_CHECK_FAILED_MESSAGE));
            }
            other => panic!("Expected redirect, got {:?}", other),
        }

        let redirect = svc.complete_verification(&session(), None).await;
        assert_eq!(redirect.to, Route::GenericError);
        assert!(!svc.health().await.is_healthy());
    }

    #[tokio::test]
    async fn test_unverified_plan_selection_reopens_drawer() {
        let svc = service(Arc::new(MockIdentityVerificationPort::new()));

        match svc.select_plan(&session(), "retirement", None).await.unwrap() {
            PlanSelectionView::Drawer(directive) => {
                assert!(directive.drawer_open);
                assert!(directive.show_action_button);
            }
            other => panic!("Expected drawer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_notice_is_per_user() {
        let port = Arc::new(MockIdentityVerificationPort::new());
        let svc = service(port.clone());
        let alice = session();
        let bob = UserSession::new(UserId::new("bob").unwrap(), "token");

        for user in [&alice, &bob] {
            svc.start_verification(user, false, None).await;
            port.mark_verified(&user.user_id).await;
        }

        for user in [&alice, &bob] {
            let HomeView::Status(view) = svc.check_status(user, &HomeRequest::default(), None).await else {
                panic!("Expected status view");
            };
            assert_eq!(view.directive.message, Some(crate::DrawerMessage::VerificationSucceeded));
        }
    }

    #[test]
    fn test_home_view_is_tagged() {
        let view = HomeView::Redirect(Redirect::to(Route::VerificationInProgress));
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["view"], "redirect");
        assert_eq!(value["to"], "/verification-in-progress");
    }

    #[tokio::test]
    async fn test_unknown_plan() {
        let svc = service(Arc::new(MockIdentityVerificationPort::new()));
        let result = svc.select_plan(&session(), "enterprise", None).await;
        assert!(matches!(result, Err(VerificationError::UnknownPlan(_))));
    }
}
