//! Sign-in, registration and sign-out.

use actix_web::{HttpResponse, web};

use quill_core::services::{Credentials, Registration};
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginRequest, RegisterRequest};

use super::action_response;
use crate::middleware::error::{ActionError, AppResult};
use crate::middleware::session::Session;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ActionError> {
    let LoginRequest { email, password } = body.into_inner();

    let outcome = state
        .actions
        .login(Credentials { email, password })
        .await?;

    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ActionError> {
    let RegisterRequest {
        name,
        email,
        password,
    } = body.into_inner();

    let outcome = state
        .actions
        .register(Registration {
            name,
            email,
            password,
        })
        .await?;

    Ok(action_response(
        HttpResponse::Created(),
        outcome,
        &state.settings,
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(state: web::Data<AppState>) -> Result<HttpResponse, ActionError> {
    let outcome = state.actions.sign_out().await?;
    Ok(action_response(HttpResponse::Ok(), outcome, &state.settings))
}

/// GET /api/auth/session - the signed-in user, or `null`.
pub async fn current_session(session: Session) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session.0)))
}
