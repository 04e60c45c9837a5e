//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod profile;

#[cfg(test)]
mod tests;

use std::future::Future;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, HttpResponseBuilder, web};
use serde::Serialize;
use uuid::Uuid;

use quill_core::domain::View;
use quill_core::validation::ValidationError;
use quill_core::{ActionOutcome, DomainError};
use quill_shared::{ActionResponse, ApiResponse};

use crate::config::HttpSettings;
use crate::middleware::error::{ActionError, AppError, AppResult};
use crate::middleware::session::apply_session_change;
use crate::state::AppState;

#[cfg(feature = "rate-limit")]
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Response header reporting whether a read was served from the view cache.
pub const VIEW_CACHE_HEADER: &str = "X-View-Cache";

/// Configure all application routes. Sign-in and registration go through
/// the state's rate limiter when one is configured.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    let login = web::resource("/login").route(web::post().to(auth::login));
    let register = web::resource("/register").route(web::post().to(auth::register));

    let auth_scope = match state.rate_limiter.clone() {
        #[cfg(feature = "rate-limit")]
        Some(limiter) => {
            let trust = state.settings.trust_proxy_headers;
            web::scope("/auth")
                .service(login.wrap(
                    RateLimitMiddleware::new(limiter.clone()).trust_proxy_headers(trust),
                ))
                .service(register.wrap(RateLimitMiddleware::new(limiter).trust_proxy_headers(trust)))
        }
        _ => web::scope("/auth").service(login).service(register),
    };

    // Bodies and query strings only feed actions, so malformed input gets the
    // action failure shape.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        invalid_input("body", err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        invalid_input("query", err.to_string()).into()
    }));

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                auth_scope
                    .route("/sign-out", web::post().to(auth::sign_out))
                    .route("/session", web::get().to(auth::current_session)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::save_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .route("/users/{id}/posts", web::get().to(posts::user_posts))
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile)),
            )
            .service(
                web::scope("/admin")
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}/role", web::put().to(admin::change_role))
                    .route("/posts", web::get().to(admin::list_posts)),
            ),
    );
}

/// Serve `view` from the cache, or await `load`, cache its JSON and serve it.
///
/// `load` is only polled on a miss. Failed loads are never cached.
async fn cached_json<T, F>(state: &AppState, view: View, load: F) -> AppResult<HttpResponse>
where
    T: Serialize,
    F: Future<Output = Result<T, AppError>>,
{
    if let Some(body) = state.views.fetch(&view).await {
        tracing::debug!(view = %view, "View cache hit");
        return Ok(json_body(body, "hit"));
    }

    let data = load.await?;
    let body = serde_json::to_string(&ApiResponse::ok(data))
        .map_err(|e| AppError::Domain(DomainError::Internal(e.to_string())))?;

    if let Err(e) = state
        .views
        .store(&view, &body, Some(state.settings.view_cache_ttl))
        .await
    {
        tracing::warn!(view = %view, error = %e, "Failed to cache view");
    }

    Ok(json_body(body, "miss"))
}

/// Malformed request input, reported like any other failed validation.
fn invalid_input(field: &'static str, constraint: String) -> ActionError {
    ActionError(DomainError::Validation(ValidationError::new(field, constraint)))
}

/// Parse the `{id}` segment of an action route.
fn action_id(raw: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(raw).map_err(|e| invalid_input("id", format!("must be a UUID ({e})")))
}

fn json_body(body: String, cache_status: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((VIEW_CACHE_HEADER, cache_status))
        .body(body)
}

/// Render a successful action, writing the session cookie if it changed.
fn action_response(
    mut builder: HttpResponseBuilder,
    outcome: ActionOutcome,
    settings: &HttpSettings,
) -> HttpResponse {
    apply_session_change(&mut builder, &outcome.session, settings.cookie_secure);
    builder.json(ActionResponse::ok(outcome.message, outcome.redirect))
}
