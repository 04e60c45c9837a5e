//! View cache implementations - Redis and in-memory fallback.

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemoryViewCache;
#[cfg(feature = "redis")]
pub use redis::{RedisConfig, RedisViewCache};
