//! Middleware, extractors and error responses.

pub mod error;
pub mod session;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;
