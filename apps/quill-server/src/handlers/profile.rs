use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_core::domain::{Post, PublicUser, View};
use quill_shared::dto::UpdateProfileRequest;

use super::{action_response, cached_json};
use crate::middleware::error::{ActionError, AppError, AppResult};
use crate::middleware::session::{ActionSession, Session};
use crate::state::AppState;

#[derive(Serialize)]
struct ProfilePage {
    user: PublicUser,
    posts: Vec<Post>,
}

/// GET /api/profile - the signed-in user and their posts.
pub async fn get_profile(state: web::Data<AppState>, session: Session) -> AppResult<HttpResponse> {
    let id = session.require()?.id;

    cached_json(&state, View::Profile(id), async {
        let user = state
            .queries
            .user_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let posts = state.queries.user_posts(id).await?;
        Ok::<_, AppError>(ProfilePage { user, posts })
    })
    .await
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    session: ActionSession,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ActionError> {
    let outcome = state
        .actions
        .update_profile(session.user(), &body.name)
        .await?;

    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}
