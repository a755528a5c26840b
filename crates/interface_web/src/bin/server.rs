//! Guardio Life - Web Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults and ./runtime-config.json
//! cargo run --bin guardio-web
//!
//! # Override settings from the environment
//! GUARDIO_PORT=3001 GUARDIO_IDV_PROVIDER_ID=... cargo run --bin guardio-web
//! ```
//!
//! # Environment Variables
//!
//! * `GUARDIO_HOST` - Server host (default: 0.0.0.0)
//! * `GUARDIO_PORT` - Server port (default: 8080)
//! * `GUARDIO_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `GUARDIO_JWT_SECRET` - HS256 secret for local token validation (optional)
//! * `GUARDIO_DATABASE_URL` - PostgreSQL URL for the notice store (optional)
//! * `GUARDIO_IDV_TIMEOUT_SECS` - Identity server request timeout (default: 30)
//! * `GUARDIO_RUNTIME_CONFIG_PATH` - Client configuration file (default: runtime-config.json)
//! * `GUARDIO_IDENTITY_SERVER_URL`, `GUARDIO_CLIENT_ID`, `GUARDIO_IDV_PROVIDER_ID` -
//!   override the matching runtime configuration values

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

use domain_verification::{
    InMemoryNoticeStore, SuccessNoticeStore, VerificationService, VerificationSettings,
};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgNoticeStore};
use infra_idv::{IdvClientConfig, IdvHttpAdapter};
use interface_web::config::{ApiConfig, RuntimeConfig};
use interface_web::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading server configuration")?;
    init_tracing(&config.log_level);

    let runtime = config.apply_overrides(
        RuntimeConfig::load(&config.runtime_config_path)
            .with_context(|| format!("loading {}", config.runtime_config_path))?,
    );
    runtime.validate().context("validating runtime configuration")?;

    if runtime.client_id().is_none() {
        tracing::warn!("clientID is not configured; /runtime-config.json will report it missing");
    }
    if runtime.idv_provider_id().is_none() {
        tracing::warn!("identityVerificationProviderId is not configured");
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        identity_server = %runtime.base_url,
        "Starting Guardio Life web server"
    );

    let idv = IdvHttpAdapter::new(
        IdvClientConfig::new(runtime.base_url.clone()).with_timeout_secs(config.idv_timeout_secs),
    )
    .context("creating identity server client")?;

    let notices = create_notice_store(&config).await?;

    let settings = VerificationSettings {
        idv_provider_id: runtime.idv_provider_id().map(str::to_string),
        ..Default::default()
    };
    let service = VerificationService::new(Arc::new(idv), notices, settings);

    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_router(AppState::new(service, config, runtime));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// PostgreSQL when a database URL is configured, in-memory otherwise.
async fn create_notice_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn SuccessNoticeStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(&DatabaseConfig::new(url.clone()))
                .await
                .context("connecting to the notice database")?;
            run_migrations(&pool).await.context("running migrations")?;
            tracing::info!("Using PostgreSQL success notice store");
            Ok(Arc::new(PgNoticeStore::new(pool)))
        }
        None => {
            tracing::info!("No database configured; success notices are kept in memory");
            Ok(Arc::new(InMemoryNoticeStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
