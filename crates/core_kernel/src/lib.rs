//! Core Kernel - Foundational types shared by the Guardio Life crates
//!
//! This crate provides the building blocks used across the workspace:
//! - User and correlation identifiers
//! - Money types for plan pricing
//! - Port infrastructure (errors, health checks) for adapters

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency};
pub use identifiers::{UserId, CorrelationId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult, AdapterHealth,
};
