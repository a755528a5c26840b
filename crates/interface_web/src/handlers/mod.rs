//! Request handlers

pub mod health;
pub mod plans;
pub mod runtime_config;
pub mod verification;

use axum::Extension;

use core_kernel::{CorrelationId, OperationMetadata};
use domain_verification::UserSession;

/// Metadata forwarded with every identity server call
pub(crate) fn operation_metadata(
    session: &UserSession,
    correlation_id: Option<Extension<CorrelationId>>,
) -> OperationMetadata {
    let correlation_id = correlation_id.map(|Extension(id)| id).unwrap_or_default();
    OperationMetadata::with_correlation_id(correlation_id.to_string())
        .initiated_by(session.user_id.as_str())
}
