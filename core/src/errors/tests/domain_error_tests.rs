//! Unit tests for domain error types

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};

use crate::errors::{DomainError, StoreError, TokenError};

#[test]
fn test_jwt_error_kind_mapping() {
    assert_eq!(
        TokenError::from(JwtError::from(ErrorKind::ExpiredSignature)),
        TokenError::Expired
    );
    assert_eq!(
        TokenError::from(JwtError::from(ErrorKind::InvalidSignature)),
        TokenError::InvalidSignature
    );
    assert_eq!(
        TokenError::from(JwtError::from(ErrorKind::InvalidAlgorithm)),
        TokenError::InvalidSignature
    );
    assert_eq!(
        TokenError::from(JwtError::from(ErrorKind::InvalidToken)),
        TokenError::Malformed
    );
    assert_eq!(
        TokenError::from(JwtError::from(ErrorKind::InvalidIssuer)),
        TokenError::Malformed
    );
}

#[test]
fn test_store_unavailable_maps_to_store_unavailable() {
    let error = DomainError::from_store(StoreError::unavailable("connection refused"));
    match error {
        DomainError::StoreUnavailable { message } => assert_eq!(message, "connection refused"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_other_store_errors_are_bridged() {
    let error = DomainError::from_store(StoreError::DuplicateId {
        token_id: "abc".to_string(),
    });
    assert!(matches!(error, DomainError::Store(StoreError::DuplicateId { .. })));
}

#[test]
fn test_error_messages() {
    let error = DomainError::TokenReuseDetected {
        subject: "u1".to_string(),
    };
    assert!(error.to_string().contains("u1"));

    let error: DomainError = TokenError::Expired.into();
    assert_eq!(error.to_string(), "Token expired");
}
