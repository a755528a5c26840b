//! Identity Server IDV Adapter
//!
//! Implements [`IdentityVerificationPort`] over the identity server's
//! user-scoped IDV REST API:
//!
//! - `GET  {base}/api/users/v1/me/idv/claims/?idVProviderId={id}`
//! - `POST {base}/api/users/v1/me/idv/verify`
//!
//! Calls carry the session user's access token as a bearer token; the
//! identity server scopes both endpoints to that user.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_idv::{IdvClientConfig, IdvHttpAdapter};
//!
//! let adapter = IdvHttpAdapter::new(IdvClientConfig::new("https://localhost:9443"))?;
//! let claims = adapter.get_claims(&session, "idvp-1", None).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
use domain_verification::{IdVResponse, IdentityVerificationPort, UserSession, VerificationClaim, VerifyRequest};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::IdvClientConfig;
use crate::error::{map_status, map_transport_error, IdvClientError};

const CLAIMS_PATH: &str = "api/users/v1/me/idv/claims/";
const VERIFY_PATH: &str = "api/users/v1/me/idv/verify";
const PROVIDER_QUERY_PARAM: &str = "idVProviderId";
const ADAPTER_ID: &str = "identity-server-idv";

/// Header carrying the request's correlation id to the identity server
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// reqwest-backed identity server adapter
#[derive(Debug, Clone)]
pub struct IdvHttpAdapter {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl IdvHttpAdapter {
    pub fn new(config: IdvClientConfig) -> Result<Self, IdvClientError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, config)
    }

    /// Uses a caller-provided client, e.g. one with custom TLS roots
    pub fn with_client(http: reqwest::Client, config: IdvClientConfig) -> Result<Self, IdvClientError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(IdvClientError::UnsupportedBaseUrl(config.base_url));
        }
        // Tenant-qualified bases like `/t/carbon.super` must keep their path on join
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            timeout: Duration::from_secs(config.timeout_secs),
            circuit_breaker: config.circuit_breaker.map(|cb| Arc::new(CircuitBreaker::new(cb))),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the claims listing for a provider
    pub fn claims_url(&self, idv_provider_id: &str) -> Result<Url, PortError> {
        let mut url = self.endpoint(CLAIMS_PATH)?;
        url.query_pairs_mut()
            .append_pair(PROVIDER_QUERY_PARAM, idv_provider_id);
        Ok(url)
    }

    pub fn verify_url(&self) -> Result<Url, PortError> {
        self.endpoint(VERIFY_PATH)
    }

    fn endpoint(&self, path: &str) -> Result<Url, PortError> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::internal(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        metadata: Option<&OperationMetadata>,
    ) -> Result<R, PortError> {
        if let Some(cb) = &self.circuit_breaker {
            if !cb.is_available().await {
                return Err(PortError::ServiceUnavailable {
                    service: "identity server circuit is open".to_string(),
                });
            }
        }

        let request = match metadata.and_then(|m| m.correlation_id.as_deref()) {
            Some(id) => request.header(CORRELATION_HEADER, id),
            None => request,
        };

        let started = Instant::now();
        let result = self.send(operation, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Some(cb) = &self.circuit_breaker {
            match &result {
                Ok(_) => cb.record_success(),
                Err(e) if e.is_transient() => cb.record_failure().await,
                Err(_) => {}
            }
        }

        match &result {
            Ok(_) => debug!(operation, elapsed_ms, "Identity server call succeeded"),
            Err(e) => warn!(operation, elapsed_ms, error = %e, "Identity server call failed"),
        }
        result
    }

    async fn send<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<R, PortError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(operation, timeout_ms, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(operation, status, retry_after, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(operation, timeout_ms, e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            PortError::transformation(format!("{} returned an unexpected body: {}", operation, e))
        })
    }
}

impl DomainPort for IdvHttpAdapter {}

#[async_trait]
impl HealthCheckable for IdvHttpAdapter {
    /// HEAD request against the base URL; anything but a 5xx counts as
    /// reachable
    ///
    /// Once the reset timeout has elapsed the request doubles as the
    /// half-open probe, so readiness can recover without user traffic.
    async fn health_check(&self) -> HealthCheckResult {
        if let Some(cb) = &self.circuit_breaker {
            if !cb.is_available().await {
                return HealthCheckResult {
                    status: AdapterHealth::Degraded,
                    message: Some("Circuit breaker is open".to_string()),
                    ..HealthCheckResult::healthy(ADAPTER_ID)
                };
            }
        }

        let started = Instant::now();
        let result = match self.http.head(self.base_url.clone()).send().await {
            Ok(response) if response.status().is_server_error() => Err(format!(
                "Identity server answered {}",
                response.status()
            )),
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        if let Some(cb) = &self.circuit_breaker {
            match &result {
                Ok(()) => cb.record_success(),
                Err(_) => cb.record_failure().await,
            }
        }

        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID).with_latency_ms(latency_ms),
            Err(message) => {
                warn!(error = %message, "Identity server health check failed");
                HealthCheckResult::unhealthy(ADAPTER_ID, message).with_latency_ms(latency_ms)
            }
        }
    }
}

#[async_trait]
impl IdentityVerificationPort for IdvHttpAdapter {
    async fn get_claims(
        &self,
        session: &UserSession,
        idv_provider_id: &str,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<VerificationClaim>, PortError> {
        let url = self.claims_url(idv_provider_id)?;
        let request = self.http.get(url).bearer_auth(session.access_token());
        self.execute("get_claims", request, metadata.as_ref()).await
    }

    async fn change_verification_status(
        &self,
        session: &UserSession,
        request: &VerifyRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<IdVResponse, PortError> {
        let url = self.verify_url()?;
        let builder = self
            .http
            .post(url)
            .bearer_auth(session.access_token())
            .json(request);
        self.execute("change_verification_status", builder, metadata.as_ref()).await
    }
}
