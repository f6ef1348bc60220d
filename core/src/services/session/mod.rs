//! Session lifecycle services
//!
//! `SessionIssuer` mints new sessions, `SessionRefresher` rotates refresh
//! tokens and detects reuse, `SessionService` ties both together with
//! logout and access token verification.

mod issuer;
mod refresher;
mod service;


pub use issuer::SessionIssuer;
pub use refresher::SessionRefresher;
pub use service::SessionService;
