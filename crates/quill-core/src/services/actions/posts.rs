use uuid::Uuid;

use crate::domain::{Post, PostDraft, PublicUser, View};
use crate::error::{DomainError, RepoError};
use crate::services::forms::PostForm;
use crate::services::outcome::{ActionOutcome, ActionResult};

use super::BlogActions;

fn post_page(id: Uuid) -> String {
    format!("/posts/{id}")
}

impl BlogActions {
    /// Create a post, or update one when the form carries an id.
    pub async fn save_post(&self, session: Option<&PublicUser>, form: PostForm) -> ActionResult {
        let actor = session.ok_or(DomainError::Unauthorized)?;
        form.validate()?;

        match form.into_draft() {
            (None, draft) => self.create_post(actor, draft).await,
            (Some(id), draft) => self.update_post(actor, id, draft).await,
        }
    }

    async fn create_post(&self, author: &PublicUser, draft: PostDraft) -> ActionResult {
        let post = self
            .posts
            .insert(Post::new(author, draft))
            .await
            .map_err(|e| DomainError::store("save post", e))?;

        self.revalidate(&[View::Home, View::AdminPosts, View::Profile(author.id)])
            .await;
        tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");

        Ok(ActionOutcome::new("Post created!").redirect_to(post_page(post.id)))
    }

    async fn update_post(&self, actor: &PublicUser, id: Uuid, draft: PostDraft) -> ActionResult {
        let existing = self.load_post(id, "save post").await?;
        if !existing.is_editable_by(actor) {
            tracing::warn!(post_id = %id, user_id = %actor.id, "Rejected edit of foreign post");
            return Err(DomainError::Forbidden {
                action: "edit this post",
            });
        }

        // Last write wins: nothing guards against a concurrent edit between
        // the ownership check and this write.
        self.posts
            .update_body(id, draft)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::post_not_found(id),
                other => DomainError::store("save post", other),
            })?;

        self.revalidate(&[
            View::Post(id),
            View::AdminPosts,
            View::Home,
            View::Profile(existing.author_id),
        ])
        .await;
        tracing::info!(post_id = %id, user_id = %actor.id, "Post updated");

        Ok(ActionOutcome::new("Post updated!").redirect_to(post_page(id)))
    }

    /// Delete a post. `redirect_on_success` asks for a redirect home, which a
    /// plain form submission wants and an embedding page does not.
    pub async fn delete_post(
        &self,
        session: Option<&PublicUser>,
        id: Uuid,
        redirect_on_success: bool,
    ) -> ActionResult {
        let actor = session.ok_or(DomainError::Unauthorized)?;

        let post = self.load_post(id, "delete post").await?;
        if !post.is_editable_by(actor) {
            tracing::warn!(post_id = %id, user_id = %actor.id, "Rejected delete of foreign post");
            return Err(DomainError::Forbidden {
                action: "delete this post",
            });
        }

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => DomainError::store("delete post", other),
        })?;

        self.revalidate(&[
            View::Home,
            View::AdminPosts,
            View::Profile(post.author_id),
            View::Post(id),
        ])
        .await;
        tracing::info!(post_id = %id, user_id = %actor.id, "Post deleted");

        let outcome = ActionOutcome::new("Post deleted successfully");
        Ok(if redirect_on_success {
            outcome.redirect_to("/")
        } else {
            outcome
        })
    }

    async fn load_post(&self, id: Uuid, operation: &'static str) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::store(operation, e))?
            .ok_or_else(|| DomainError::post_not_found(id))
    }
}
