//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{StoreError, TokenError};

use thiserror::Error;

/// Errors surfaced by the session services
#[derive(Error, Debug)]
pub enum DomainError {
    /// The presented token is unknown, expired, tampered or of the wrong kind
    #[error("Invalid token")]
    InvalidToken,

    /// A revoked refresh token was presented again
    #[error("Refresh token reuse detected for subject {subject}")]
    TokenReuseDetected { subject: String },

    #[error("Token store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Map a store failure, surfacing outages as `StoreUnavailable`
    pub fn from_store(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable { message } => DomainError::StoreUnavailable { message },
            other => DomainError::Store(other),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
