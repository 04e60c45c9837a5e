//! Read-side data access.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PublicUser, User, normalize_email};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

/// Typed reads over the `users` and `posts` collections.
#[derive(Clone)]
pub struct BlogQueries {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl BlogQueries {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    /// Every post, newest first.
    pub async fn posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts
            .list_recent()
            .await
            .map_err(|e| DomainError::store("load posts", e))
    }

    pub async fn post(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::store("load post", e))
    }

    /// Posts by one author, newest first.
    pub async fn user_posts(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.posts
            .find_by_author(author_id)
            .await
            .map_err(|e| DomainError::store("load posts", e))
    }

    /// Full user record including the password hash. Server-internal.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.users
            .find_by_email(&normalize_email(email))
            .await
            .map_err(|e| DomainError::store("load user", e))
    }

    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<PublicUser>, DomainError> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::store("load user", e))?;
        Ok(user.map(PublicUser::from))
    }

    pub async fn users(&self) -> Result<Vec<PublicUser>, DomainError> {
        let users = self
            .users
            .list()
            .await
            .map_err(|e| DomainError::store("load users", e))?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}
