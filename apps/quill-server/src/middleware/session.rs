//! Session cookie handling.
//!
//! The `session_token` cookie carries a signed token. [`Session`] resolves it
//! to the current user on every request for read endpoints and
//! [`ActionSession`] does the same for actions; [`apply_session_change`]
//! writes the cookie after an action signs someone in or out.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder, dev::Payload, web};
use futures::future::LocalBoxFuture;

use quill_core::domain::PublicUser;
use quill_core::{DomainError, SessionChange};

use crate::middleware::error::{ActionError, AppError};
use crate::state::AppState;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// The signed-in user, if any.
///
/// A missing, forged or expired cookie resolves to `Session(None)`; it never
/// fails the request. Only a store failure does.
#[derive(Debug, Clone)]
pub struct Session(pub Option<PublicUser>);

impl Session {
    pub fn user(&self) -> Option<&PublicUser> {
        self.0.as_ref()
    }

    /// The signed-in user, or `Unauthorized`.
    pub fn require(&self) -> Result<&PublicUser, AppError> {
        self.user().ok_or(AppError::Unauthorized)
    }

    /// The signed-in administrator. No session is `Unauthorized`, a
    /// non-admin session is `Forbidden`.
    pub fn require_admin(&self) -> Result<&PublicUser, AppError> {
        let user = self.require()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Resolve the session cookie of `req` against the application state.
fn resolve_session(
    req: &HttpRequest,
) -> LocalBoxFuture<'static, Result<Option<PublicUser>, DomainError>> {
    let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
    let sessions = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.sessions.clone());

    Box::pin(async move {
        let Some(sessions) = sessions else {
            tracing::error!("AppState not found in app data");
            return Ok(None);
        };

        sessions.resolve(token.as_deref()).await
    })
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = resolve_session(req);
        Box::pin(async move { Ok::<_, AppError>(Session(user.await?)) })
    }
}

/// The signed-in user as seen by an action. Identical to [`Session`] except
/// that a failed lookup is reported in the action failure shape.
#[derive(Debug, Clone)]
pub struct ActionSession(pub Option<PublicUser>);

impl ActionSession {
    pub fn user(&self) -> Option<&PublicUser> {
        self.0.as_ref()
    }
}

impl FromRequest for ActionSession {
    type Error = ActionError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = resolve_session(req);
        Box::pin(async move { Ok::<_, ActionError>(ActionSession(user.await?)) })
    }
}

/// Set or clear the session cookie on `response` according to `change`.
pub fn apply_session_change(
    response: &mut HttpResponseBuilder,
    change: &SessionChange,
    secure: bool,
) {
    match change {
        SessionChange::Unchanged => {}
        SessionChange::Start { token, max_age } => {
            response.cookie(session_cookie(token.clone(), *max_age, secure));
        }
        SessionChange::End => {
            let mut cookie = session_cookie(String::new(), std::time::Duration::ZERO, secure);
            cookie.make_removal();
            response.cookie(cookie);
        }
    }
}

fn session_cookie(token: String, max_age: std::time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(
            i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX),
        ))
        .finish()
}
