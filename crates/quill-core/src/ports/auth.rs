//! Session token and password hashing ports.

use std::time::Duration;

use uuid::Uuid;

/// Verified contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issues and verifies the signed token stored in the session cookie.
pub trait TokenService: Send + Sync {
    /// Issue a session token for a user.
    fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Verify signature, issuer and expiry, and decode the claims.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// How long an issued token stays valid. Also used as the cookie max-age.
    fn session_ttl(&self) -> Duration;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Signing error: {0}")]
    Signing(String),
}
