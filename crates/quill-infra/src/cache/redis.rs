//! Redis view cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use quill_core::domain::View;
use quill_core::ports::{CacheError, ViewCache};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
    /// Use the in-memory cache when Redis cannot be reached at startup
    pub fallback_to_memory: bool,
    /// Prepended to every view key
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            fallback_to_memory: true,
            key_prefix: "quill:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.fallback_to_memory),
            key_prefix: defaults.key_prefix,
        }
    }
}

/// View cache backed by Redis, shared between server instances.
pub struct RedisViewCache {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisViewCache {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis view cache");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix,
        })
    }

    fn key(&self, view: &View) -> String {
        format!("{}{}", self.key_prefix, view.cache_key())
    }
}

#[async_trait]
impl ViewCache for RedisViewCache {
    async fn fetch(&self, view: &View) -> Option<String> {
        let key = self.key(view);
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn store(
        &self,
        view: &View,
        body: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let key = self.key(view);
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => conn
                .set_ex::<_, _, ()>(&key, body, duration.as_secs().max(1))
                .await
                .map_err(|e| CacheError::Operation(e.to_string())),
            None => conn
                .set::<_, _, ()>(&key, body)
                .await
                .map_err(|e| CacheError::Operation(e.to_string())),
        }
    }

    async fn invalidate(&self, view: &View) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(view))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_cache() -> Option<RedisViewCache> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            fallback_to_memory: false,
            key_prefix: "quill-test:".to_string(),
        };

        RedisViewCache::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_store_fetch_invalidate() {
        let Some(cache) = test_cache().await else {
            tracing::warn!("Redis not available, skipping test");
            return;
        };

        cache.store(&View::Home, "[]", None).await.unwrap();
        assert_eq!(cache.fetch(&View::Home).await, Some("[]".to_string()));

        cache.invalidate(&View::Home).await.unwrap();
        assert_eq!(cache.fetch(&View::Home).await, None);
    }

    #[tokio::test]
    async fn test_ttl_expires() {
        let Some(cache) = test_cache().await else {
            return;
        };

        cache
            .store(&View::AdminPosts, "[]", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.fetch(&View::AdminPosts).await, None);
    }
}
