//! Cache module
//!
//! - `redis_client` - Redis connection with retry and script execution
//! - `redis_code_cache` - Code store on Redis scripts
//! - `local_code_cache` - Code store in a process-local LRU

pub mod local_code_cache;
pub mod redis_client;
pub mod redis_code_cache;

#[cfg(test)]
mod tests;

pub use local_code_cache::LocalCodeCache;
pub use redis_client::RedisClient;
pub use redis_code_cache::RedisCodeCache;
