//! Navigation decisions returned to the UI

use serde::{Deserialize, Serialize};

/// Pages of the shopping UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[serde(rename = "/")]
    Home,
    #[serde(rename = "/verify")]
    Verify,
    #[serde(rename = "/verification-in-progress")]
    VerificationInProgress,
    #[serde(rename = "/success")]
    Success,
    #[serde(rename = "/generic-error")]
    GenericError,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Verify => "/verify",
            Route::VerificationInProgress => "/verification-in-progress",
            Route::Success => "/success",
            Route::GenericError => "/generic-error",
        }
    }
}

/// State carried along with a navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reinitiate: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub verification_initiated: bool,
}

/// Instruction to navigate to another page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: Route,
    #[serde(default)]
    pub state: NavigationState,
}

impl Redirect {
    pub fn to(route: Route) -> Self {
        Self {
            to: route,
            state: NavigationState::default(),
        }
    }

    /// Generic error page showing `message`
    pub fn generic_error(message: impl Into<String>) -> Self {
        Self {
            to: Route::GenericError,
            state: NavigationState {
                message: Some(message.into()),
                ..Default::default()
            },
        }
    }

    /// Verify page; `reinitiate` resumes an interrupted workflow run
    pub fn verify(reinitiate: bool) -> Self {
        Self {
            to: Route::Verify,
            state: NavigationState {
                reinitiate,
                ..Default::default()
            },
        }
    }

    /// Home page, flagged as returning from a completed widget flow
    pub fn home_after_verification() -> Self {
        Self {
            to: Route::Home,
            state: NavigationState {
                verification_initiated: true,
                ..Default::default()
            },
        }
    }

    /// Success page for the selected plan
    pub fn success(plan_title: impl Into<String>) -> Self {
        Self {
            to: Route::Success,
            state: NavigationState {
                plan: Some(plan_title.into()),
                ..Default::default()
            },
        }
    }

    /// Message carried to the generic error page, if any
    pub fn message(&self) -> Option<&str> {
        self.state.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redirect_serializes_path_and_sparse_state() {
        let value = serde_json::to_value(Redirect::generic_error("boom")).unwrap();
        assert_eq!(value, json!({ "to": "/generic-error", "state": { "message": "boom" } }));

        let value = serde_json::to_value(Redirect::verify(false)).unwrap();
        assert_eq!(value, json!({ "to": "/verify", "state": {} }));
    }

    #[test]
    fn test_route_paths_match_serialization() {
        for route in [
            Route::Home,
            Route::Verify,
            Route::VerificationInProgress,
            Route::Success,
            Route::GenericError,
        ] {
            assert_eq!(serde_json::to_value(route).unwrap(), json!(route.path()));
        }
    }
}
