mod memory;
mod r#trait;

pub use memory::InMemoryTokenStore;
pub use r#trait::TokenStore;
