//! Cache module - Redis client and the Redis-backed refresh record store

pub mod redis_client;
pub mod redis_token_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use redis_client::RedisClient;
pub use redis_token_store::RedisTokenStore;
