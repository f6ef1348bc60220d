//! # WAF Console Core
//!
//! Session token engine for the WAF Console backend.
//! This crate contains the domain entities, the token codec, the refresh
//! record store contract with an in-memory backend, and the services that
//! issue, rotate and revoke sessions.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AuthResponse, Principal, RefreshRecord, TokenClaims, TokenKind, TokenPair, UserProfile,
    UserRole,
};
pub use errors::{DomainError, DomainResult, StoreError, TokenError};
pub use repositories::{InMemoryPrincipalDirectory, InMemoryTokenStore, PrincipalResolver, TokenStore};
pub use services::{
    SessionIssuer, SessionRefresher, SessionService, SigningKeys, SweepResult, SweeperConfig,
    TokenCodec, TokenServiceConfig, TokenSweeper,
};
