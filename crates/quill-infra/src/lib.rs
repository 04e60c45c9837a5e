//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! repositories, session tokens, password hashing, view caching and
//! rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT session tokens + Argon2 password hashing
//! - `rate-limit` - Rate limiting via governor
//! - `redis` - Redis view cache

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use cache::InMemoryViewCache;
pub use database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, DatabaseConnections, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "redis")]
pub use cache::{RedisConfig, RedisViewCache};
