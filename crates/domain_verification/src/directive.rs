//! UI directives for the verification drawer

use serde::{Deserialize, Serialize};

/// Severity of the drawer message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Info,
    Success,
}

/// Every message the drawer can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerMessage {
    /// No claim exists yet
    VerificationRequired,
    /// Claim verified, shown once per user
    VerificationSucceeded,
    /// Workflow awaiting input; the user can pick up where they left off
    ResumeVerification,
    /// Workflow processing
    InProgress,
    /// approved, declined or abandoned on an unverified claim
    VerificationFailed,
    /// Workflow under manual review
    UnderReview,
    /// Provider reported an error
    ProviderError,
    /// Status missing or not recognised
    StatusUnclear,
}

impl DrawerMessage {
    /// Text shown to the user
    pub fn text(&self) -> &'static str {
        match self {
            DrawerMessage::VerificationRequired => {
                "You need to verify your age and identity to select a Guardio Life plan."
            }
            DrawerMessage::VerificationSucceeded => {
                "Age verification is successful! You're all set to continue with selecting a plan."
            }
            DrawerMessage::ResumeVerification => {
                "Your age verification was interrupted. Please resume the verification to continue."
            }
            DrawerMessage::InProgress => {
                "Your age verification is in progress. Please check back later to complete your plan selection."
            }
            DrawerMessage::VerificationFailed => {
                "Age verification failed. Please contact support for assistance."
            }
            DrawerMessage::UnderReview => {
                "Your age verification is under review. Please check back later."
            }
            DrawerMessage::ProviderError => {
                "An error occurred during age verification. Please try again later or contact support."
            }
            DrawerMessage::StatusUnclear => {
                "Age verification status unclear. Please contact support for assistance."
            }
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            DrawerMessage::VerificationSucceeded => MessageType::Success,
            _ => MessageType::Info,
        }
    }

    /// Whether the "Verify Age" action accompanies this message
    pub fn offers_action(&self) -> bool {
        matches!(
            self,
            DrawerMessage::VerificationRequired | DrawerMessage::ResumeVerification
        )
    }
}

/// What the UI should do with the verification drawer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiDirective {
    pub drawer_open: bool,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<DrawerMessage>,
    pub message_text: String,
    pub show_action_button: bool,
}

impl UiDirective {
    /// Drawer closed, nothing to say
    pub fn hidden() -> Self {
        Self {
            drawer_open: false,
            message_type: MessageType::Info,
            message: None,
            message_text: String::new(),
            show_action_button: false,
        }
    }

    /// Drawer open with the given message
    pub fn drawer(message: DrawerMessage) -> Self {
        Self {
            drawer_open: true,
            message_type: message.message_type(),
            message: Some(message),
            message_text: message.text().to_string(),
            show_action_button: message.offers_action(),
        }
    }

    /// Forces the drawer open while keeping the message, used when the user
    /// tries to select a plan before being verified
    pub fn reopened(mut self) -> Self {
        if self.message.is_some() {
            self.drawer_open = true;
        }
        self
    }
}
