//! Tests for core_kernel identifiers

use core_kernel::{CorrelationId, UserId};

#[test]
fn test_user_id_from_str() {
    let id: UserId = "0b6f1c9e-6d1e-4b0f-9a3e-2f1d6c7e8a90".parse().unwrap();
    assert_eq!(id.as_str(), "0b6f1c9e-6d1e-4b0f-9a3e-2f1d6c7e8a90");
}

#[test]
fn test_user_id_blank_is_rejected() {
    let parsed: Result<UserId, _> = "".parse();
    assert!(parsed.is_err());
}

#[test]
fn test_user_id_serializes_as_plain_string() {
    let id = UserId::new("alice").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"alice\"");
}

#[test]
fn test_correlation_ids_are_unique() {
    let a = CorrelationId::new();
    let b = CorrelationId::new();
    assert_ne!(a, b);
}
