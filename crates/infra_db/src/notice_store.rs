//! PostgreSQL Success Notice Store
//!
//! Persists the one-time success notice flags in the `success_notices`
//! table so they survive restarts and are shared across instances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_verification::{NoticeKey, SuccessNoticeStore};

use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-notice-store";

/// PostgreSQL-backed [`SuccessNoticeStore`]
#[derive(Debug, Clone)]
pub struct PgNoticeStore {
    pool: PgPool,
}

impl PgNoticeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// When the notice was first recorded, if ever
    pub async fn shown_at(&self, key: &NoticeKey) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT shown_at FROM success_notices WHERE notice_key = $1",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))
    }
}

impl DomainPort for PgNoticeStore {}

#[async_trait]
impl HealthCheckable for PgNoticeStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID).with_latency_ms(latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, format!("Database error: {}", e))
                .with_latency_ms(latency_ms),
        }
    }
}

#[async_trait]
impl SuccessNoticeStore for PgNoticeStore {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn is_shown(&self, key: &NoticeKey) -> Result<bool, PortError> {
        let shown = self.shown_at(key).await?.is_some();
        debug!(shown, "Read success notice flag");
        Ok(shown)
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn mark_shown(&self, key: &NoticeKey) -> Result<(), PortError> {
        // First write wins; the original timestamp is kept
        sqlx::query(
            "INSERT INTO success_notices (notice_key, shown_at) VALUES ($1, $2) \
             ON CONFLICT (notice_key) DO NOTHING",
        )
        .bind(key.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!("Recorded success notice flag");
        Ok(())
    }
}
