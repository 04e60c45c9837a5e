//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use quill_core::services::Registration;
use quill_infra::JwtConfig;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use quill_infra::RedisConfig;
#[cfg(feature = "rate-limit")]
use quill_infra::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub http: HttpSettings,
    pub jwt: JwtConfig,
    /// Administrator account created or promoted at startup.
    pub bootstrap_admin: Option<Registration>,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// `None` when `REDIS_URL` is unset.
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
}

/// Settings the handlers read on every request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Lifetime of cached view bodies.
    pub view_cache_ttl: Duration,
    /// Take the client address from `Forwarded`/`X-Forwarded-For`. Only safe
    /// behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cookie_secure: false,
            view_cache_ttl: Duration::from_secs(300),
            trust_proxy_headers: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        let http = HttpSettings {
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(production),
            view_cache_ttl: env::var("VIEW_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(HttpSettings::default().view_cache_ttl),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            production,
            http,
            jwt: JwtConfig::from_env(),
            bootstrap_admin: Self::bootstrap_admin(),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
        }
    }

    /// `BOOTSTRAP_ADMIN_EMAIL` and `BOOTSTRAP_ADMIN_PASSWORD` are both required;
    /// the name defaults to "Admin".
    fn bootstrap_admin() -> Option<Registration> {
        let email = env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?;
        let Ok(password) = env::var("BOOTSTRAP_ADMIN_PASSWORD") else {
            tracing::warn!("BOOTSTRAP_ADMIN_EMAIL set without BOOTSTRAP_ADMIN_PASSWORD, skipping");
            return None;
        };

        Some(Registration {
            name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            email,
            password,
        })
    }
}
