//! Per-key in-memory rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Tracked keys above which idle buckets are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window for one key.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }

    fn quota(&self) -> Result<Quota, RateLimitError> {
        let burst = NonZeroU32::new(self.max_requests)
            .ok_or_else(|| RateLimitError::Backend("max_requests must be non-zero".into()))?;

        Quota::with_period(self.window / burst.get())
            .map(|quota| quota.allow_burst(burst))
            .ok_or_else(|| RateLimitError::Backend("window must be non-zero".into()))
    }
}

/// GCRA limiter with one bucket per key.
///
/// Limits are per process, not shared across instances.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        Ok(Self {
            limiter: DefaultKeyedRateLimiter::keyed(config.quota()?),
            clock: DefaultClock::default(),
        })
    }

    pub fn from_env() -> Result<Self, RateLimitError> {
        Self::new(RateLimitConfig::from_env())
    }

    /// Number of keys with a bucket in memory.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Drop buckets that have fully refilled; they behave like unseen keys.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.prune();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(RateLimitResult {
                allowed: true,
                retry_after: Duration::ZERO,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                retry_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}
