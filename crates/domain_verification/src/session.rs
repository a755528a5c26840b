//! Authenticated user session

use std::fmt;

use core_kernel::UserId;

/// The caller's identity and the access token forwarded to the identity server
#[derive(Clone)]
pub struct UserSession {
    pub user_id: UserId,
    access_token: String,
}

impl UserSession {
    pub fn new(user_id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let session = UserSession::new(UserId::new("alice").unwrap(), "secret-token");
        let debug = format!("{:?}", session);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret-token"));
    }
}
