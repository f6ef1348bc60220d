//! Error types for the token codec and the refresh record store

use thiserror::Error;

/// Failures of encoding or decoding a signed token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token encoding failed: {message}")]
    EncodingError { message: String },

    #[error("Failed to load signing key: {message}")]
    KeyLoad { message: String },
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Failures reported by a `TokenStore` backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Refresh record not found: {token_id}")]
    NotFound { token_id: String },

    #[error("Refresh record already exists: {token_id}")]
    DuplicateId { token_id: String },

    #[error("Refresh record already revoked: {token_id}")]
    AlreadyRevoked { token_id: String },

    #[error("Token store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Build an `Unavailable` error from any displayable backend failure
    pub fn unavailable(source: impl std::fmt::Display) -> Self {
        StoreError::Unavailable {
            message: source.to_string(),
        }
    }
}
