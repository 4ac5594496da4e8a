#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use pressdesk_api::auth::jwt::JwtConfig;
use pressdesk_api::auth::password::hash_password;
use pressdesk_api::config::ServerConfig;
use pressdesk_api::router::build_app_router;
use pressdesk_api::state::AppState;
use pressdesk_db::models::user::{CreateUser, User};
use pressdesk_db::repositories::{RoleRepo, UserRepo};

/// Password given to every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        session_cleanup_interval_secs: 3600,
        bootstrap_admin: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// The production router and middleware stack over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

/// POST without a body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the `data` member of the envelope.
pub async fn expect_data(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let mut json = body_json(response).await;
    json["data"].take()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user holding the named roles, password [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, roles: &[&str]) -> User {
    let mut role_ids = Vec::new();
    for name in roles {
        let role = RoleRepo::find_by_name(pool, name)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("role {name} should be seeded"));
        role_ids.push(role.id);
    }

    let input = CreateUser {
        name: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
    };
    UserRepo::create_with_roles(pool, &input, &role_ids)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the full `data` payload.
pub async fn login(pool: &PgPool, email: &str) -> Value {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    expect_data(response, StatusCode::OK).await
}

/// Create a user with `roles` and return it with a fresh access token.
pub async fn user_with_token(pool: &PgPool, email: &str, roles: &[&str]) -> (User, String) {
    let user = create_user(pool, email, roles).await;
    let data = login(pool, email).await;
    let token = data["access_token"].as_str().unwrap().to_string();
    (user, token)
}
