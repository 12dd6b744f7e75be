// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use backend_lib::error::AppError;
use quickcare_common::ErrorResponse;

#[test]
fn test_app_error_error_codes() {
    assert_eq!(AppError::InvalidInput("x".to_string()).error_code(), "VAL_001");
    assert_eq!(AppError::DuplicateAccount.error_code(), "ACCT_001");
    assert_eq!(AppError::AccountNotFound.error_code(), "AUTH_002");
    assert_eq!(AppError::InvalidCredentials.error_code(), "AUTH_002");
    assert_eq!(AppError::InvalidToken.error_code(), "AUTH_003");
    assert_eq!(AppError::AuthRateLimited.error_code(), "AUTH_004");
    assert_eq!(AppError::Storage("down".to_string()).error_code(), "STORE_001");
    assert_eq!(AppError::Internal("test".to_string()).error_code(), "INT_001");
}

#[test]
fn test_sanitized_messages_hide_details() {
    let err = AppError::Storage("/var/lib/quickcare/users: permission denied".to_string());
    assert!(!err.sanitized_message().contains("/var/lib"));

    let err = AppError::Internal("scrypt params".to_string());
    assert_eq!(err.sanitized_message(), "An internal server error occurred");
}

#[test]
fn test_credential_failure_classification() {
    assert!(AppError::AccountNotFound.is_credential_failure());
    assert!(AppError::InvalidCredentials.is_credential_failure());
    assert!(!AppError::InvalidToken.is_credential_failure());
    assert!(!AppError::DuplicateAccount.is_credential_failure());
}

#[tokio::test]
async fn test_storage_error_response() {
    let response = AppError::Storage("disk full".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.error.code, "STORE_001");
}
