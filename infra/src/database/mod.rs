//! Database module - MySQL implementations using SQLx

pub mod connection;
pub mod mysql_token_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql_token_store::MySqlTokenStore;
