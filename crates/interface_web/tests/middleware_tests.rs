//! Middleware behaviour exercised through `tower::ServiceExt::oneshot`

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tower::ServiceExt;

use core_kernel::CorrelationId;
use domain_verification::{
    InMemoryNoticeStore, MockIdentityVerificationPort, VerificationService, VerificationSettings,
};
use interface_web::auth::AccessTokenClaims;
use interface_web::config::{ApiConfig, RuntimeConfig};
use interface_web::middleware::CORRELATION_HEADER;
use interface_web::{create_router, AppState};

const SECRET: &str = "middleware-secret";

fn app() -> Router {
    let service = VerificationService::new(
        Arc::new(MockIdentityVerificationPort::new()),
        Arc::new(InMemoryNoticeStore::new()),
        VerificationSettings::with_provider("idvp-1"),
    );
    let config = ApiConfig {
        jwt_secret: Some(SECRET.to_string()),
        ..Default::default()
    };
    create_router(AppState::new(service, config, RuntimeConfig::default()))
}

fn bearer(sub: &str) -> String {
    let claims = AccessTokenClaims {
        sub: sub.to_string(),
        exp: Some((chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp()),
        iat: None,
        scope: None,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_missing_bearer_is_rejected_before_handler() {
    let request = Request::builder()
        .uri("/api/v1/verification/status")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let claims = AccessTokenClaims {
        sub: "mallory".to_string(),
        exp: Some((chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp()),
        iat: None,
        scope: None,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"other")).unwrap();

    let request = Request::builder()
        .uri("/api/v1/verification/status")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_incoming_correlation_id_is_reused() {
    let correlation_id = CorrelationId::new().to_string();
    let request = Request::builder()
        .uri("/api/v1/verification/status")
        .header(header::AUTHORIZATION, bearer("alice"))
        .header(CORRELATION_HEADER, correlation_id.as_str())
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CORRELATION_HEADER).unwrap().to_str().unwrap(),
        correlation_id
    );
}

#[tokio::test]
async fn test_malformed_correlation_id_is_replaced() {
    let request = Request::builder()
        .uri("/api/v1/verification/status")
        .header(header::AUTHORIZATION, bearer("alice"))
        .header(CORRELATION_HEADER, "not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let echoed = response
        .headers()
        .get(CORRELATION_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert_ne!(echoed, "not-a-uuid");
    assert!(echoed.parse::<CorrelationId>().is_ok());
}

#[tokio::test]
async fn test_public_routes_skip_authentication() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(CORRELATION_HEADER).is_none());
}
