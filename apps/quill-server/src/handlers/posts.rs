use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::View;
use quill_core::services::PostForm;
use quill_shared::ApiResponse;
use quill_shared::dto::{DeletePostQuery, SavePostRequest};

use super::{action_id, action_response, cached_json};
use crate::middleware::error::{ActionError, AppError, AppResult};
use crate::middleware::session::ActionSession;
use crate::state::AppState;

/// GET /api/posts - every post, newest first.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    cached_json(&state, View::Home, async {
        Ok::<_, AppError>(state.queries.posts().await?)
    })
    .await
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    cached_json(&state, View::Post(id), async {
        state
            .queries
            .post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
    })
    .await
}

/// GET /api/users/{id}/posts
pub async fn user_posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.queries.user_posts(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/posts - create, or update when the body carries an `id`.
pub async fn save_post(
    state: web::Data<AppState>,
    session: ActionSession,
    body: web::Json<SavePostRequest>,
) -> Result<HttpResponse, ActionError> {
    let SavePostRequest {
        id,
        title,
        cover_image,
        content,
    } = body.into_inner();

    let outcome = state
        .actions
        .save_post(
            session.user(),
            PostForm {
                id,
                title,
                cover_image,
                content,
            },
        )
        .await?;

    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}

/// DELETE /api/posts/{id}?redirect=true
pub async fn delete_post(
    state: web::Data<AppState>,
    session: ActionSession,
    path: web::Path<String>,
    query: web::Query<DeletePostQuery>,
) -> Result<HttpResponse, ActionError> {
    let id = action_id(&path)?;

    let outcome = state
        .actions
        .delete_post(session.user(), id, query.redirect)
        .await?;

    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}
