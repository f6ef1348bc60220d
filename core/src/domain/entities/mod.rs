//! Domain entities representing core session objects.

pub mod principal;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use principal::{Principal, UserRole};
pub use token::{
    RefreshRecord, TokenClaims, TokenKind, TokenPair, ACCESS_TOKEN_EXPIRY_SECONDS, JWT_AUDIENCE,
    JWT_ISSUER, REFRESH_TOKEN_EXPIRY_DAYS, TOKEN_TYPE_BEARER,
};
