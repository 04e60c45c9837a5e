//! Mutating actions: validate, authorize, write, then invalidate views.
//!
//! Every action takes the already-resolved session instead of reading
//! request context, and returns an [`ActionResult`](super::ActionResult).

mod admin;
mod auth;
mod posts;
mod profile;

use std::sync::Arc;

use crate::domain::View;
use crate::ports::{PasswordService, PostRepository, TokenService, UserRepository, ViewCache};

/// Entry point for every mutation of users and posts.
#[derive(Clone)]
pub struct BlogActions {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    views: Arc<dyn ViewCache>,
}

impl BlogActions {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        views: Arc<dyn ViewCache>,
    ) -> Self {
        Self {
            users,
            posts,
            passwords,
            tokens,
            views,
        }
    }

    /// Drop cached copies of `views`. A cache failure only costs freshness,
    /// so it is logged and the action still succeeds.
    async fn revalidate(&self, views: &[View]) {
        for view in views {
            if let Err(e) = self.views.invalidate(view).await {
                tracing::warn!(view = %view, error = %e, "Failed to invalidate cached view");
            }
        }
    }
}
