//! In-process view cache, used when Redis is not configured or unreachable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::View;
use quill_core::ports::{CacheError, ViewCache};

struct CachedView {
    body: String,
    expires_at: Option<Instant>,
}

impl CachedView {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Instant::now() >= exp)
            .unwrap_or(false)
    }
}

/// View bodies in a `HashMap` behind an async `RwLock`. Lost on restart.
#[derive(Default)]
pub struct InMemoryViewCache {
    views: RwLock<HashMap<String, CachedView>>,
}

impl InMemoryViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live cached views.
    pub async fn len(&self) -> usize {
        self.views
            .read()
            .await
            .values()
            .filter(|v| !v.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ViewCache for InMemoryViewCache {
    async fn fetch(&self, view: &View) -> Option<String> {
        let key = view.cache_key();
        let views = self.views.read().await;
        let cached = views.get(&key)?;

        if cached.is_expired() {
            drop(views);
            self.views.write().await.remove(&key);
            return None;
        }

        Some(cached.body.clone())
    }

    async fn store(
        &self,
        view: &View,
        body: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.views.write().await.insert(
            view.cache_key(),
            CachedView {
                body: body.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );

        Ok(())
    }

    async fn invalidate(&self, view: &View) -> Result<(), CacheError> {
        self.views.write().await.remove(&view.cache_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_store_and_fetch() {
        let cache = InMemoryViewCache::new();
        cache.store(&View::Home, "[]", None).await.unwrap();

        assert_eq!(cache.fetch(&View::Home).await, Some("[]".to_string()));
        assert_eq!(cache.fetch(&View::AdminPosts).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_only_drops_that_view() {
        let cache = InMemoryViewCache::new();
        let post = View::Post(Uuid::new_v4());
        cache.store(&View::Home, "home", None).await.unwrap();
        cache.store(&post, "post", None).await.unwrap();

        cache.invalidate(&post).await.unwrap();

        assert_eq!(cache.fetch(&post).await, None);
        assert_eq!(cache.fetch(&View::Home).await, Some("home".to_string()));
    }

    #[tokio::test]
    async fn test_expired_view_is_evicted() {
        let cache = InMemoryViewCache::new();
        cache
            .store(&View::AdminUsers, "users", Some(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(cache.fetch(&View::AdminUsers).await, None);
        assert!(cache.is_empty().await);
    }
}
