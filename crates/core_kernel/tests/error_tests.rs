//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::ports::PortError;
use core_kernel::UserId;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_blank_user_subject_is_validation_error() {
    let error = UserId::new("   ").unwrap_err();

    assert!(matches!(error, CoreError::Validation(_)));
    assert!(error.to_string().contains("Validation error"));
}

#[test]
fn test_port_error_validation_field() {
    let error = PortError::validation_field("status is required", "properties");

    match error {
        PortError::Validation { message, field } => {
            assert_eq!(message, "status is required");
            assert_eq!(field.as_deref(), Some("properties"));
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_connection_is_transient() {
    let error = PortError::connection("connection refused");
    assert!(error.is_transient());
    assert!(error.to_string().contains("connection refused"));
}
