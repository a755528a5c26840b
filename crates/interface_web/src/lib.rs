//! HTTP Layer
//!
//! Backend for the Guardio Life shopping UI, using Axum.
//!
//! # Routes
//!
//! Public:
//! - `GET /health`, `GET /health/ready`
//! - `GET /runtime-config.json`
//! - `GET /api/v1/plans`
//!
//! Authenticated (bearer access token from the identity server):
//! - `GET  /api/v1/verification/status` - drawer directive for the home page
//! - `POST /api/v1/verification/start` - SDK token for the widget
//! - `POST /api/v1/verification/complete` - widget finished
//! - `POST /api/v1/plans/:slug/select` - plan selection
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_web::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, config, runtime));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_verification::VerificationService;

use crate::config::{ApiConfig, RuntimeConfig};
use crate::handlers::{health, plans, runtime_config, verification};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VerificationService>,
    pub config: Arc<ApiConfig>,
    pub runtime: Arc<RuntimeConfig>,
}

impl AppState {
    pub fn new(service: VerificationService, config: ApiConfig, runtime: RuntimeConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            runtime: Arc::new(runtime),
        }
    }
}

/// Creates the main router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/runtime-config.json", get(runtime_config::get_runtime_config))
        .route("/api/v1/plans", get(plans::list_plans));

    let verification_routes = Router::new()
        .route("/status", get(verification::get_status))
        .route("/start", post(verification::start_verification))
        .route("/complete", post(verification::complete_verification));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/verification", verification_routes)
        .route("/plans/:slug/select", post(plans::select_plan))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
