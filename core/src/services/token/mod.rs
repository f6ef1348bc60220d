//! Token module for JWT handling
//!
//! - Codec configuration and its bridge from the shared JWT config
//! - HMAC and RSA signing keys
//! - Encoding and validation of access and refresh tokens
//! - Background sweep of expired refresh records

mod codec;
mod config;
mod key_manager;
mod sweeper;


pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use key_manager::{KeySource, SigningKeys};
pub use sweeper::{SweepResult, SweeperConfig, TokenSweeper};
