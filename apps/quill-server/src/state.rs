//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    PasswordService, PostRepository, RateLimiter, TokenService, UserRepository, ViewCache,
};
use quill_core::{BlogActions, BlogQueries, SessionResolver};
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, InMemoryViewCache,
    JwtTokenService,
};

#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

use crate::config::{AppConfig, HttpSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actions: BlogActions,
    pub queries: BlogQueries,
    pub sessions: SessionResolver,
    pub views: Arc<dyn ViewCache>,
    pub settings: Arc<HttpSettings>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

/// The adapters a state is assembled from.
pub struct Adapters {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub tokens: Arc<dyn TokenService>,
    pub views: Arc<dyn ViewCache>,
}

impl AppState {
    /// Build the application state, degrading to in-memory adapters where
    /// the database or Redis is not configured or not reachable.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        let (db, users, posts) = Self::repositories(config).await;
        #[cfg(not(feature = "postgres"))]
        let (users, posts) = Self::repositories();

        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::from_env()?);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let views = Self::view_cache(config).await?;

        let mut state = Self::from_parts(
            Adapters {
                users,
                posts,
                passwords,
                tokens,
                views,
            },
            config.http.clone(),
        );

        #[cfg(feature = "rate-limit")]
        {
            let limiter = quill_infra::InMemoryRateLimiter::new(config.rate_limit.clone())?;
            state.rate_limiter = Some(Arc::new(limiter));
        }

        #[cfg(feature = "postgres")]
        {
            state.db = db;
        }

        if let Some(admin) = &config.bootstrap_admin {
            let admin = state.actions.ensure_admin(admin.clone()).await?;
            tracing::info!(user_id = %admin.id, "Bootstrap administrator ready");
        }

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Assemble a state from ready-made adapters.
    pub fn from_parts(adapters: Adapters, settings: HttpSettings) -> Self {
        let Adapters {
            users,
            posts,
            passwords,
            tokens,
            views,
        } = adapters;

        Self {
            actions: BlogActions::new(
                users.clone(),
                posts.clone(),
                passwords,
                tokens.clone(),
                views.clone(),
            ),
            queries: BlogQueries::new(users.clone(), posts),
            sessions: SessionResolver::new(tokens, users),
            views,
            settings: Arc::new(settings),
            rate_limiter: None,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// In-memory state with cheap password hashing, for tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let passwords = Argon2PasswordService::with_params(1024, 1, 1)
            .expect("valid argon2 parameters");

        Self::from_parts(
            Adapters {
                users,
                posts,
                passwords: Arc::new(passwords),
                tokens: Arc::new(JwtTokenService::new(quill_infra::JwtConfig::default())),
                views: Arc::new(InMemoryViewCache::new()),
            },
            HttpSettings::default(),
        )
    }

    #[cfg(feature = "postgres")]
    async fn repositories(
        config: &AppConfig,
    ) -> (
        Option<Arc<DatabaseConnections>>,
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
    ) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (
                None,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryPostRepository::new()),
            );
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let conn = Arc::new(connections);
                let users = Arc::new(PostgresUserRepository::new(conn.main.clone()));
                let posts = Arc::new(PostgresPostRepository::new(conn.main.clone()));
                (Some(conn), users, posts)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                (
                    None,
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryPostRepository::new()),
                )
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    fn repositories() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        )
    }

    #[cfg(feature = "redis")]
    async fn view_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn ViewCache>> {
        let Some(redis_config) = &config.redis else {
            tracing::info!("REDIS_URL not set. Caching views in memory.");
            return Ok(Arc::new(InMemoryViewCache::new()));
        };

        match quill_infra::RedisViewCache::new(redis_config.clone()).await {
            Ok(cache) => Ok(Arc::new(cache)),
            Err(e) if redis_config.fallback_to_memory => {
                tracing::warn!(error = %e, "Redis unavailable. Caching views in memory.");
                Ok(Arc::new(InMemoryViewCache::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn view_cache(_config: &AppConfig) -> anyhow::Result<Arc<dyn ViewCache>> {
        Ok(Arc::new(InMemoryViewCache::new()))
    }
}
