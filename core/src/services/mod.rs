//! Business services containing the session token engine.

pub mod session;
pub mod token;

// Re-export commonly used types
pub use session::{SessionIssuer, SessionRefresher, SessionService};
pub use token::{
    KeySource, SigningKeys, SweepResult, SweeperConfig, TokenCodec, TokenServiceConfig,
    TokenSweeper,
};
