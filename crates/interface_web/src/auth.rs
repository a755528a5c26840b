//! Access token handling
//!
//! The UI sends the identity server's access token as a bearer token. The
//! `sub` claim identifies the user; the raw token is forwarded to the
//! identity server, which performs its own validation.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_verification::UserSession;

/// Claims read from the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration timestamp
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,
    /// Space-separated scopes
    #[serde(default)]
    pub scope: Option<String>,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Extracts the token from an `Authorization: Bearer` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Decodes an access token
///
/// With a secret, the HS256 signature and expiry are validated. Without
/// one, only the expiry is checked. The `aud` claim must contain
/// `audience` when one is given and is ignored otherwise.
pub fn decode_token(
    token: &str,
    secret: Option<&str>,
    audience: Option<&str>,
) -> Result<AccessTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    match audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let key = match secret {
        Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

/// Builds the session for a bearer token
pub fn authenticate(
    token: &str,
    secret: Option<&str>,
    audience: Option<&str>,
) -> Result<UserSession, AuthError> {
    let claims = decode_token(token, secret, audience)?;
    let user_id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
    Ok(UserSession::new(user_id, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, exp: i64, secret: &str) -> String {
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            exp: Some(exp),
            iat: None,
            scope: Some("openid profile".to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn future() -> i64 {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("Bearer  ")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_verified_decode() {
        let t = token("alice", future(), "secret");
        assert_eq!(decode_token(&t, Some("secret"), None).unwrap().sub, "alice");
        assert!(matches!(decode_token(&t, Some("other"), None), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_unverified_decode_reads_subject() {
        let t = token("alice", future(), "identity-server-key");
        let session = authenticate(&t, None, None).unwrap();
        assert_eq!(session.user_id.as_str(), "alice");
        assert_eq!(session.access_token(), t);
    }

    #[test]
    fn test_expired_token() {
        let t = token("alice", 1_000_000_000, "secret");
        assert!(matches!(decode_token(&t, None, None), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_blank_subject_rejected() {
        let t = token(" ", future(), "secret");
        assert!(matches!(authenticate(&t, Some("secret"), None), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(decode_token("not.a.jwt", None, None), Err(AuthError::InvalidToken)));
    }

    fn token_with_audience(aud: serde_json::Value, secret: &str) -> String {
        let claims = serde_json::json!({
            "sub": "alice",
            "aud": aud,
            "iss": "https://localhost:9443/oauth2/token",
            "exp": future(),
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_audience_accepted_without_configured_client() {
        let t = token_with_audience(serde_json::json!("client-1"), "secret");
        assert_eq!(authenticate(&t, None, None).unwrap().user_id.as_str(), "alice");
        assert_eq!(authenticate(&t, Some("secret"), None).unwrap().user_id.as_str(), "alice");
    }

    #[test]
    fn test_audience_matches_configured_client() {
        let t = token_with_audience(serde_json::json!("client-1"), "secret");
        assert!(authenticate(&t, None, Some("client-1")).is_ok());
        assert!(authenticate(&t, Some("secret"), Some("client-1")).is_ok());

        let list = token_with_audience(serde_json::json!(["other", "client-1"]), "secret");
        assert!(authenticate(&list, Some("secret"), Some("client-1")).is_ok());
    }

    #[test]
    fn test_foreign_audience_rejected() {
        let t = token_with_audience(serde_json::json!("another-app"), "secret");
        assert!(matches!(authenticate(&t, None, Some("client-1")), Err(AuthError::InvalidToken)));
        assert!(matches!(
            authenticate(&t, Some("secret"), Some("client-1")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_configured_client_allows_tokens_without_audience() {
        let t = token("alice", future(), "secret");
        assert!(authenticate(&t, Some("secret"), Some("client-1")).is_ok());
    }
}
