//! Integration tests for sign-in (`/me`) and the admin surface.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, put_json_auth, sign_in, sign_in_with_roles};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_sign_in_creates_profile(pool: PgPool) {
    let token = common::token_for("new-person");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, "/api/v1/me", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "new-person@example.com");
    assert_eq!(json["data"]["display_name"], "new-person");
    assert_eq!(json["data"]["is_validated"], false);
    assert_eq!(json["data"]["roles"], json!(["user"]));
    assert!(json["data"].get("external_id").is_none());

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_canonicalizes_languages(pool: PgPool) {
    let (_, token) = sign_in(&pool, "linguist").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/me",
        json!({
            "display_name": "Lin Guist",
            "bio": "Subtitler",
            "skills": ["subtitling"],
            "languages": ["EN", "zh-cn"]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Lin Guist");
    assert_eq!(json["data"]["languages"], json!(["en", "zh-CN"]));

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, "/api/v1/me", json!({ "languages": ["xx"] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_admin_bootstrap_happens_once(pool: PgPool) {
    let (first, first_token) = sign_in(&pool, "first").await;
    let (_, second_token) = sign_in(&pool, "second").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/status", &first_token).await;
    assert_eq!(body_json(response).await["data"]["admin_exists"], false);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, "/api/v1/admin/initialize", &first_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], first.id);
    assert_eq!(json["data"]["is_validated"], true);
    assert!(json["data"]["roles"]
        .as_array()
        .unwrap()
        .contains(&json!("admin")));

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, "/api/v1/admin/initialize", &second_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/status", &second_token).await;
    assert_eq!(body_json(response).await["data"]["admin_exists"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_routes_require_admin(pool: PgPool) {
    let (_, token) = sign_in_with_roles(&pool, "translator-1", &["translator"]).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["kind"], "permission_denied");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_users_by_role(pool: PgPool) {
    let (_, admin_token) = sign_in_with_roles(&pool, "admin-1", &["admin"]).await;
    sign_in_with_roles(&pool, "translator-1", &["translator"]).await;
    sign_in_with_roles(&pool, "translator-2", &["translator", "reviewer"]).await;
    sign_in(&pool, "plain").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/users?role=translator", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/users?limit=2&offset=0", &admin_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["limit"], 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users?role=wizard", &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_manages_roles_and_validation(pool: PgPool) {
    let (admin, admin_token) = sign_in_with_roles(&pool, "admin-1", &["admin"]).await;
    let (member, _) = sign_in(&pool, "member").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/roles", member.id),
        json!({ "roles": ["reviewer", "audio_producer"] }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let roles = body_json(response).await["data"]["roles"].clone();
    for role in ["reviewer", "audio_producer", "user"] {
        assert!(roles.as_array().unwrap().contains(&json!(role)), "missing {role}");
    }

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/validation", member.id),
        json!({ "is_validated": true }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_validated"], true);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/roles", member.id),
        json!({ "roles": ["conductor"] }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Admins keep their own admin role.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/roles", admin.id),
        json!({ "roles": ["translator"] }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(
        app,
        &format!("/api/v1/admin/users/{}/promote", member.id),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/v1/admin/users/999999/validation",
        json!({ "is_validated": true }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
