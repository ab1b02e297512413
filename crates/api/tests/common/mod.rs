#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tflow_api::auth::jwt::{generate_token, JwtConfig};
use tflow_api::config::ServerConfig;
use tflow_api::router::build_app_router;
use tflow_api::state::AppState;
use tflow_db::models::user::{UpsertUser, User};
use tflow_db::repositories::UserRepo;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and no read retries so failures surface
/// immediately.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        project_cache_ttl_secs: 300,
        read_retry_attempts: 1,
        read_retry_delay_ms: 1,
        log_json: false,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
            token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Same builder as the binary.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

/// Bearer token for an identity, as the identity provider would issue it.
pub fn token_for(external_id: &str) -> String {
    generate_token(
        external_id,
        &format!("{external_id}@example.com"),
        Some(external_id),
        &test_config().jwt,
    )
    .expect("token generation should succeed")
}

/// Create a signed-in user directly in the database and return it with a
/// matching token.
pub async fn sign_in(pool: &PgPool, external_id: &str) -> (User, String) {
    let user = UserRepo::upsert(
        pool,
        &UpsertUser {
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.com"),
            display_name: Some(external_id.to_string()),
        },
    )
    .await
    .expect("user upsert should succeed");
    (user, token_for(external_id))
}

/// Create a validated user holding `roles` (plus `user`).
pub async fn sign_in_with_roles(pool: &PgPool, external_id: &str, roles: &[&str]) -> (User, String) {
    let (user, token) = sign_in(pool, external_id).await;
    let mut names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    names.push("user".to_string());
    UserRepo::set_roles(pool, user.id, &names).await.unwrap();
    let user = UserRepo::set_validated(pool, user.id, true)
        .await
        .unwrap()
        .unwrap();
    (user, token)
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
