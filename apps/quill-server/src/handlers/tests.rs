use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use quill_core::RepoError;
use quill_core::domain::{Role, User};
use quill_core::ports::{BaseRepository, TokenService, UserRepository};
use quill_core::services::Registration;
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryViewCache, JwtConfig, JwtTokenService,
};

use super::{VIEW_CACHE_HEADER, configure_routes};
use crate::config::HttpSettings;
use crate::middleware::session::SESSION_COOKIE;
use crate::state::{Adapters, AppState};

macro_rules! init_app {
    ($state:expr) => {{
        let state: AppState = $state;
        test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(move |cfg| configure_routes(cfg, &state)),
        )
        .await
    }};
}

fn register_request(name: &str, email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": name, "email": email, "password": "password123" }))
}

fn post_body(title: &str) -> Value {
    json!({
        "title": title,
        "coverImage": "https://images.example.com/cover.png",
        "content": "Borrowing rules keep aliasing and mutation apart. ".repeat(4),
    })
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("response should set the session cookie")
}

fn view_cache_status<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(VIEW_CACHE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn admin_state() -> AppState {
    let state = AppState::in_memory();
    state
        .actions
        .ensure_admin(Registration {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    state
}

#[actix_rt::test]
async fn health_reports_ok() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn register_sets_http_only_session_cookie() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.max_age().is_some());

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Account created");
    assert_eq!(body["redirect"], "/");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/session")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn duplicate_registration_is_conflict() {
    let app = init_app!(AppState::in_memory());
    test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;

    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(res.response().cookies().next().is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn wrong_password_is_rejected_without_cookie() {
    let app = init_app!(AppState::in_memory());
    test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "not-the-password" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.response().cookies().next().is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Invalid email or password");
}

#[actix_rt::test]
async fn sign_out_clears_cookie() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/auth/sign-out").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    assert_eq!(cookie.value(), "");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["redirect"], "/login");
}

#[actix_rt::test]
async fn forged_cookie_is_anonymous() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/session")
            .cookie(Cookie::new(SESSION_COOKIE, "forged"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["data"].is_null());
}

#[actix_rt::test]
async fn post_lifecycle_refreshes_cached_views() {
    let app = init_app!(AppState::in_memory());
    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let cookie = session_cookie(&res);

    let list = || test::TestRequest::get().uri("/api/posts").to_request();
    let res = test::call_service(&app, list()).await;
    assert_eq!(view_cache_status(&res), "miss");
    let res = test::call_service(&app, list()).await;
    assert_eq!(view_cache_status(&res), "hit");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .cookie(cookie.clone())
            .set_json(post_body("Lifetimes explained"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Post created!");
    let redirect = body["redirect"].as_str().unwrap().to_string();

    let res = test::call_service(&app, list()).await;
    assert_eq!(view_cache_status(&res), "miss");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Lifetimes explained");
    assert_eq!(body["data"][0]["authorName"], "Ada");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api{redirect}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let id = redirect.trim_start_matches("/posts/");
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}?redirect=true"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["redirect"], "/");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn anonymous_post_is_unauthorized_with_login_redirect() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(post_body("Anonymous thoughts"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["redirect"], "/login");
}

#[actix_rt::test]
async fn invalid_post_is_unprocessable() {
    let app = init_app!(AppState::in_memory());
    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let cookie = session_cookie(&res);

    let mut body = post_body("Hi");
    body["content"] = json!("too short");
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn admin_views_distinguish_anonymous_and_non_admin() {
    let app = init_app!(AppState::in_memory());
    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/admin/users").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/users")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn admin_promotes_user() {
    let app = init_app!(admin_state().await);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "root@example.com", "password": "password123" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let admin_cookie = session_cookie(&res);

    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let user_cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/session")
            .cookie(user_cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/users/{user_id}/role"))
            .cookie(admin_cookie.clone())
            .set_json(json!({ "role": Role::Admin.as_str() }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "User role updated to admin");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/users")
            .cookie(user_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn profile_update_shows_on_next_read() {
    let app = init_app!(AppState::in_memory());
    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let cookie = session_cookie(&res);

    let profile = || {
        test::TestRequest::get()
            .uri("/api/profile")
            .cookie(cookie.clone())
            .to_request()
    };
    let res = test::call_service(&app, profile()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(view_cache_status(&res), "miss");

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/profile")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Ada King" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, profile()).await;
    assert_eq!(view_cache_status(&res), "miss");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["user"]["name"], "Ada King");
}

#[actix_rt::test]
async fn incomplete_body_is_unprocessable_action_failure() {
    let app = init_app!(AppState::in_memory());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "name": "Ada" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.response().cookies().next().is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid fields"));
}

#[actix_rt::test]
async fn malformed_post_id_is_unprocessable_action_failure() {
    let app = init_app!(AppState::in_memory());
    let res = test::call_service(&app, register_request("Ada", "ada@example.com").to_request()).await;
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/posts/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
}

/// User store that is down.
struct UnreachableUsers;

#[async_trait]
impl BaseRepository<User, Uuid> for UnreachableUsers {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }

    async fn insert(&self, _user: User) -> Result<User, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }
}

#[async_trait]
impl UserRepository for UnreachableUsers {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }

    async fn update_name(&self, _id: Uuid, _name: &str) -> Result<User, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }

    async fn set_role(&self, _id: Uuid, _role: Role) -> Result<User, RepoError> {
        Err(RepoError::Connection("connection refused".to_string()))
    }
}

#[actix_rt::test]
async fn session_store_failure_on_action_uses_action_shape() {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
    let token = tokens.issue(Uuid::new_v4()).unwrap();
    let state = AppState::from_parts(
        Adapters {
            users: Arc::new(UnreachableUsers),
            posts: Arc::new(InMemoryPostRepository::new()),
            passwords: Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap()),
            tokens,
            views: Arc::new(InMemoryViewCache::new()),
        },
        HttpSettings::default(),
    );
    let app = init_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .set_json(post_body("Lifetimes explained"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().contains("refused"));
}

#[cfg(feature = "rate-limit")]
#[actix_rt::test]
async fn login_attempts_are_limited_per_peer_despite_forwarded_for() {
    use quill_infra::{InMemoryRateLimiter, RateLimitConfig};

    let mut state = AppState::in_memory();
    state.rate_limiter = Some(Arc::new(
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: std::time::Duration::from_secs(60),
        })
        .unwrap(),
    ));
    let app = init_app!(state);

    let peer = "198.51.100.20:52000".parse().unwrap();
    let mut statuses = Vec::new();
    for i in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer)
            .insert_header(("X-Forwarded-For", format!("10.0.0.{i}")))
            .set_json(json!({ "email": "ada@example.com", "password": "password123" }))
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(&statuses[..2], &[StatusCode::UNAUTHORIZED, StatusCode::UNAUTHORIZED]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}
