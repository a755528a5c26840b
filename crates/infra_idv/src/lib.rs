//! Identity Server Infrastructure
//!
//! HTTP adapter for the identity server's identity-verification API, built
//! on reqwest. The adapter forwards the signed-in user's access token and
//! maps HTTP failures onto `PortError`.

pub mod adapter;
pub mod config;
pub mod error;
mod circuit_breaker;

pub use adapter::{IdvHttpAdapter, CORRELATION_HEADER};
pub use config::{CircuitBreakerConfig, IdvClientConfig};
pub use error::{map_status, map_transport_error, IdvClientError};
