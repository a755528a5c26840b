//! Identity server client configuration

/// Thresholds for the adapter's circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit
    pub failure_threshold: u32,
    /// Consecutive successes that close it again
    pub success_threshold: u32,
    /// Seconds before an open circuit lets a probe request through
    pub reset_timeout_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout_secs: 30,
        }
    }
}

/// Connection settings for the identity server
#[derive(Debug, Clone)]
pub struct IdvClientConfig {
    /// Base URL of the identity server (e.g. "https://localhost:9443")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Circuit breaker settings; `None` disables the breaker
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for IdvClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:9443".to_string(),
            timeout_secs: 30,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

impl IdvClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn without_circuit_breaker(mut self) -> Self {
        self.circuit_breaker = None;
        self
    }
}
