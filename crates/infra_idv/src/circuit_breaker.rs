//! Circuit breaker guarding calls to the identity server

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::CircuitBreakerConfig;

/// Opens after repeated transient failures and lets a single probe through
/// once the reset timeout has elapsed
#[derive(Debug)]
pub(crate) struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub(crate) fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Relaxed)
    }

    pub(crate) async fn is_available(&self) -> bool {
        if !self.is_open() {
            return true;
        }

        // Half-open once the timeout has elapsed
        match *self.opened_at.read().await {
            Some(at) => at.elapsed() >= Duration::from_secs(self.config.reset_timeout_secs),
            None => true,
        }
    }

    pub(crate) fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        if !self.is_open() {
            return;
        }
        let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= u64::from(self.config.success_threshold) {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    pub(crate) async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= u64::from(self.config.failure_threshold) {
            if !self.is_open.swap(true, Ordering::Relaxed) {
                warn!(failures, "Identity server circuit opened");
            }
            *self.opened_at.write().await = Some(Instant::now());
        }
    }
}
