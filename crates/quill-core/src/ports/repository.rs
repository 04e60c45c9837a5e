use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostDraft, Role, User};
use crate::error::RepoError;

/// Generic repository trait defining the operations every collection supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Deleting a missing entity is `RepoError::NotFound`.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// The `users` collection.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, oldest account first.
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Rename a user. Only the `name` column is written.
    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, RepoError>;

    /// Change a user's role. Only the `role` column is written.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, RepoError>;
}

/// The `posts` collection.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts written by one author, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Overwrite title, content and cover image. Author fields, `created_at`
    /// and the excerpt are left untouched.
    async fn update_body(&self, id: Uuid, draft: PostDraft) -> Result<Post, RepoError>;
}
