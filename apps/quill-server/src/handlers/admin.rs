//! Administrator views and user management.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::{Role, View};
use quill_shared::dto::ChangeRoleRequest;

use super::{action_id, action_response, cached_json};
use crate::middleware::error::{ActionError, AppError, AppResult};
use crate::middleware::session::{ActionSession, Session};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    session.require_admin()?;

    cached_json(&state, View::AdminUsers, async {
        Ok::<_, AppError>(state.queries.users().await?)
    })
    .await
}

/// GET /api/admin/posts
pub async fn list_posts(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    session.require_admin()?;

    cached_json(&state, View::AdminPosts, async {
        Ok::<_, AppError>(state.queries.posts().await?)
    })
    .await
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    state: web::Data<AppState>,
    session: ActionSession,
    path: web::Path<String>,
    body: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse, ActionError> {
    let user_id = action_id(&path)?;
    let role: Role = body.role.parse().map_err(DomainError::Validation)?;

    let outcome = state
        .actions
        .change_user_role(session.user(), user_id, role)
        .await?;

    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}
