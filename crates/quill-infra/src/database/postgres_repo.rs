//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use quill_core::domain::{Post, PostDraft, Role, User, mask_email};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, RepoError> {
        let changes = user::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = changes.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, RepoError> {
        let changes = user::ActiveModel {
            id: Set(id),
            role: Set(role.as_str().to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = changes.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update_body(&self, id: Uuid, draft: PostDraft) -> Result<Post, RepoError> {
        let changes = post::ActiveModel {
            id: Set(id),
            title: Set(draft.title),
            content: Set(draft.content),
            cover_image: Set(draft.cover_image),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = changes.update(&self.db).await.map_err(write_error)?;
        Ok(model.into())
    }
}
