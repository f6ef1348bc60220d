pub mod principal;
pub mod token;

pub use principal::{InMemoryPrincipalDirectory, PrincipalResolver};
pub use token::{InMemoryTokenStore, TokenStore};
