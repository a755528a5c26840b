//! Age Verification Domain
//!
//! This crate turns the identity server's claim-verification records into
//! decisions the Guardio Life shopping UI can act on: whether to surface the
//! verification drawer, what it says, whether the "Verify Age" action is
//! offered, and where to navigate next.
//!
//! # Verification Flow
//!
//! 1. The home page asks for the status of the date-of-birth claim.
//! 2. No claim yet: the user is asked to verify and may start the flow.
//! 3. Starting the flow yields an SDK token for the document-capture widget.
//! 4. When the widget completes, the flow is marked completed and the user is
//!    sent to the in-progress page until the provider reports a result.
//! 5. A verified user sees a one-time success notice and may select a plan.
//!
//! # Examples
//!
//! ```rust
//! use domain_verification::{
//!     ClaimMetadata, DrawerMessage, VerificationClaim, VerificationStatusResolver,
//!     WorkflowStatus, DOB_CLAIM_URI,
//! };
//!
//! let resolver = VerificationStatusResolver::default();
//!
//! let claim = VerificationClaim {
//!     id: "c-1".to_string(),
//!     uri: DOB_CLAIM_URI.to_string(),
//!     is_verified: false,
//!     claim_metadata: ClaimMetadata {
//!         onfido_workflow_status: Some(WorkflowStatus::AwaitingInput),
//!         ..Default::default()
//!     },
//! };
//!
//! let resolution = resolver.resolve(Some(&claim), false);
//! assert!(resolution.directive.drawer_open);
//! assert!(resolution.directive.show_action_button);
//! assert_eq!(resolution.directive.message, Some(DrawerMessage::ResumeVerification));
//! ```

pub mod claim;
pub mod flow;
pub mod directive;
pub mod resolver;
pub mod notice;
pub mod navigation;
pub mod plans;
pub mod session;
pub mod ports;
pub mod service;
pub mod error;

pub use claim::{
    VerificationClaim, ClaimMetadata, ClaimVerificationStatus, WorkflowStatus,
    DOB_CLAIM_URI, GIVEN_NAME_CLAIM_URI, LAST_NAME_CLAIM_URI,
};
pub use flow::{SdkFlowStatus, VerifyRequest, IdVProperty, IdVResponse};
pub use directive::{UiDirective, DrawerMessage, MessageType};
pub use resolver::{VerificationStatusResolver, Resolution};
pub use notice::{SuccessNoticeStore, NoticeKey, InMemoryNoticeStore};
pub use navigation::{Route, Redirect, NavigationState};
pub use plans::{InsurancePlan, plan_catalog, find_plan};
pub use session::UserSession;
pub use ports::IdentityVerificationPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockIdentityVerificationPort;
pub use service::{
    VerificationService, VerificationSettings, HomeRequest, HomeView, StatusView,
    VerifyPageView, WidgetSession, PlanSelectionView,
};
pub use error::VerificationError;
