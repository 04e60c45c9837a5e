use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::PublicUser;

/// Number of characters of content kept in an excerpt.
pub const EXCERPT_CHARS: usize = 150;

/// Post entity - a published blog article.
///
/// `author_name` and `author_avatar` are a snapshot taken when the post is
/// created. Later profile edits do not flow back into existing posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image: String,
    pub excerpt: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The author-editable part of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub cover_image: String,
    pub content: String,
}

impl Post {
    /// Create a new post authored by `author`.
    pub fn new(author: &PublicUser, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            excerpt: excerpt_of(&draft.content),
            title: draft.title,
            content: draft.content,
            cover_image: draft.cover_image,
            author_id: author.id,
            author_name: author.name.clone(),
            author_avatar: author.avatar.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Ownership check: the original author or any admin may modify a post.
    pub fn is_editable_by(&self, actor: &PublicUser) -> bool {
        actor.id == self.author_id || actor.is_admin()
    }

    /// Overwrite the editable fields. Author fields, `created_at` and the
    /// excerpt stay as they were at creation.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.content = draft.content;
        self.cover_image = draft.cover_image;
        self.updated_at = Utc::now();
    }
}

/// First [`EXCERPT_CHARS`] characters of `content` followed by an ellipsis.
pub fn excerpt_of(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use proptest::prelude::*;

    fn author(role: Role) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            name: "Author".to_string(),
            email: "author@example.com".to_string(),
            role,
            avatar: "https://i.pravatar.cc/150?u=author@example.com".to_string(),
        }
    }

    fn draft() -> PostDraft {
        PostDraft {
            title: "Hello world".to_string(),
            cover_image: "https://images.example.com/cover.png".to_string(),
            content: "x".repeat(200),
        }
    }

    #[test]
    fn new_post_snapshots_author() {
        let author = author(Role::User);
        let post = Post::new(&author, draft());

        assert_eq!(post.author_id, author.id);
        assert_eq!(post.author_name, "Author");
        assert_eq!(post.author_avatar, author.avatar);
        assert_eq!(post.excerpt, format!("{}...", "x".repeat(150)));
    }

    #[test]
    fn only_author_or_admin_may_edit() {
        let owner = author(Role::User);
        let post = Post::new(&owner, draft());

        assert!(post.is_editable_by(&owner));
        assert!(!post.is_editable_by(&author(Role::User)));
        assert!(post.is_editable_by(&author(Role::Admin)));
    }

    #[test]
    fn apply_keeps_author_and_creation_time() {
        let owner = author(Role::User);
        let mut post = Post::new(&owner, draft());
        let created_at = post.created_at;
        let excerpt = post.excerpt.clone();

        post.apply(PostDraft {
            title: "Edited title".to_string(),
            cover_image: "https://images.example.com/other.png".to_string(),
            content: "y".repeat(120),
        });

        assert_eq!(post.title, "Edited title");
        assert_eq!(post.author_id, owner.id);
        assert_eq!(post.created_at, created_at);
        assert_eq!(post.excerpt, excerpt);
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(160);
        assert_eq!(excerpt_of(&content), format!("{}...", "é".repeat(150)));
    }

    proptest! {
        #[test]
        fn excerpt_is_prefix_plus_ellipsis(content in "\\PC{100,400}") {
            let expected: String = content.chars().take(EXCERPT_CHARS).collect();
            prop_assert_eq!(excerpt_of(&content), format!("{expected}..."));
        }
    }
}
