use std::time::Duration;

use async_trait::async_trait;

use crate::domain::View;

/// Cache of rendered view bodies, keyed by [`View`].
///
/// Reads fill it, mutating actions invalidate the views they affect.
#[async_trait]
pub trait ViewCache: Send + Sync {
    /// Cached body for a view, if present and not expired.
    async fn fetch(&self, view: &View) -> Option<String>;

    /// Store a rendered body with an optional TTL.
    async fn store(&self, view: &View, body: &str, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Drop the cached body so the next read renders fresh data.
    async fn invalidate(&self, view: &View) -> Result<(), CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
