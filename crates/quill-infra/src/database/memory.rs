//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostDraft, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// `users` collection held in a `HashMap`. Email uniqueness is enforced on insert.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users.email must be unique".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(RepoError::Constraint("users.id must be unique".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.name = name.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// `posts` collection held in a `HashMap`.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts.id must be unique".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await.values().cloned().collect();
        Ok(Self::newest_first(posts))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let posts = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(posts))
    }

    async fn update_body(&self, id: Uuid, draft: PostDraft) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(draft);
        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quill_core::domain::PublicUser;

    fn user(email: &str) -> User {
        User::new("Tester".to_string(), email.to_string(), "hash".to_string())
    }

    fn post_by(author: &User, title: &str) -> Post {
        let author = PublicUser::from(author.clone());
        Post::new(
            &author,
            PostDraft {
                title: title.to_string(),
                cover_image: "https://images.example.com/c.png".to_string(),
                content: "c".repeat(100),
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("dup@example.com")).await.unwrap();

        let err = repo.insert(user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_user_updates() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.insert(user("ada@example.com")).await.unwrap();

        let renamed = repo.update_name(saved.id, "Ada").await.unwrap();
        assert_eq!(renamed.name, "Ada");
        assert_eq!(renamed.role, Role::User);

        let promoted = repo.set_role(saved.id, Role::Admin).await.unwrap();
        assert_eq!(promoted.name, "Ada");
        assert_eq!(promoted.role, Role::Admin);

        let missing = repo.set_role(Uuid::new_v4(), Role::Admin).await;
        assert!(matches!(missing, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first() {
        let author = user("author@example.com");
        let other = user("other@example.com");
        let repo = InMemoryPostRepository::new();

        let mut older = post_by(&author, "Older post");
        older.created_at -= Duration::hours(1);
        repo.insert(older.clone()).await.unwrap();
        let newer = repo.insert(post_by(&author, "Newer post")).await.unwrap();
        repo.insert(post_by(&other, "Someone else")).await.unwrap();

        let all = repo.list_recent().await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = repo.find_by_author(author.id).await.unwrap();
        let ids: Vec<Uuid> = mine.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let repo = InMemoryPostRepository::new();
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }
}
