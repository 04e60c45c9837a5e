//! Session resolution: cookie token to authenticated user.

use std::sync::Arc;

use crate::domain::PublicUser;
use crate::error::DomainError;
use crate::ports::{TokenService, UserRepository};

/// Resolves the session token carried by a request to the user it belongs to.
#[derive(Clone)]
pub struct SessionResolver {
    tokens: Arc<dyn TokenService>,
    users: Arc<dyn UserRepository>,
}

impl SessionResolver {
    pub fn new(tokens: Arc<dyn TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Resolve a session token.
    ///
    /// A missing, forged or expired token, or one whose user no longer exists,
    /// is simply "no session". Only a store failure is an error.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Option<PublicUser>, DomainError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session token");
                return Ok(None);
            }
        };

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| DomainError::store("load session", e))?;

        if user.is_none() {
            tracing::debug!(user_id = %claims.user_id, "Session refers to a missing user");
        }

        Ok(user.map(PublicUser::from))
    }
}
