//! Integration tests for projects, phases, and videos.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, sign_in,
    sign_in_with_roles,
};
use serde_json::json;
use sqlx::PgPool;

/// Create a project as `token` and return its JSON detail.
async fn create_project(pool: &PgPool, token: &str, name: &str) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        json!({
            "name": name,
            "description": "Season one subtitles",
            "source_language": "EN",
            "target_languages": ["es", "pt-br"]
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_project_starts_at_first_phase(pool: PgPool) {
    let (owner, token) = sign_in(&pool, "owner-1").await;

    let project = create_project(&pool, &token, "Documentary").await;

    assert_eq!(project["name"], "Documentary");
    assert_eq!(project["source_language"], "en");
    assert_eq!(project["target_languages"], json!(["es", "pt-BR"]));
    assert_eq!(project["current_phase"], "translation");
    assert_eq!(project["progress"], 0);
    assert_eq!(project["owner_id"], owner.id);
    assert_eq!(project["created_by"], owner.id);
    for phase in ["translation", "proofreading", "audio_production", "audio_review"] {
        assert_eq!(project["phases"][phase], "not_started");
    }
    assert_eq!(project["assignments"], json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_project_rejects_source_in_targets(pool: PgPool) {
    let (_, token) = sign_in(&pool, "owner-1").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        json!({
            "name": "Bad pair",
            "source_language": "en",
            "target_languages": ["en", "es"]
        }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "validation");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signed_in_token_without_profile_is_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::token_for("never-signed-in");

    let response = get_auth(app, "/api/v1/projects", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outsiders_cannot_read_or_modify(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (_, outsider_token) = sign_in(&pool, "outsider").await;
    let project = create_project(&pool, &owner_token, "Private").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &outsider_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}"),
        json!({ "name": "Hijacked" }),
        &outsider_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/projects/{id}"), &outsider_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", &outsider_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_can_read_any_project(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (_, admin_token) = sign_in_with_roles(&pool, "admin-1", &["admin"]).await;
    let project = create_project(&pool, &owner_token, "Visible to admins").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/projects", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_project_applies_given_fields(pool: PgPool) {
    let (_, token) = sign_in(&pool, "owner-1").await;
    let project = create_project(&pool, &token, "Draft").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}"),
        json!({ "name": "Final", "target_languages": ["de"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Final");
    assert_eq!(json["data"]["description"], "Season one subtitles");
    assert_eq!(json["data"]["target_languages"], json!(["de"]));

    // Target equal to the stored source is rejected.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}"),
        json!({ "target_languages": ["en"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignee_moves_phase_forward(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (translator, translator_token) =
        sign_in_with_roles(&pool, "translator-1", &["translator"]).await;
    let project = create_project(&pool, &owner_token, "Workflow").await;
    let id = project["id"].as_i64().unwrap();

    // Assign the translation phase.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/assignee"),
        json!({ "user_id": translator.id }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assignments"]["translation"], translator.id);

    // The assignee sees the project and what to do next.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &translator_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["next_action"],
        json!({ "phase": "translation", "action": "start" })
    );

    // Start, then complete.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/status"),
        json!({ "status": "in_progress" }),
        &translator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["phases"]["translation"], "in_progress");
    assert_eq!(json["data"]["current_phase"], "translation");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/status"),
        json!({ "status": "completed" }),
        &translator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["phases"]["translation"], "completed");
    assert_eq!(json["data"]["phases"]["proofreading"], "not_started");
    assert_eq!(json["data"]["current_phase"], "proofreading");
    assert_eq!(json["data"]["progress"], 25);
    assert!(json["data"].get("next_action").is_none());

    // The translator has no say over other phases.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/proofreading/status"),
        json!({ "status": "in_progress" }),
        &translator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_transition_and_unknown_phase_are_rejected(pool: PgPool) {
    let (_, token) = sign_in(&pool, "owner-1").await;
    let project = create_project(&pool, &token, "Transitions").await;
    let id = project["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/status"),
        json!({ "status": "completed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/mastering/status"),
        json!({ "status": "in_progress" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing changed.
    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["phases"]["translation"], "not_started");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_requests_get_json_errors(pool: PgPool) {
    let (_, token) = sign_in(&pool, "owner-1").await;
    let project = create_project(&pool, &token, "Malformed").await;
    let id = project["id"].as_i64().unwrap();

    // Non-numeric id segment.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/projects/abc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["kind"], "validation");
    assert!(json["error"].is_string());

    // Unknown status value in an otherwise valid body.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/status"),
        json!({ "status": "done" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["kind"], "validation");

    // Unknown phase in the query string.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects?phase=mastering", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "validation");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assignment_requires_eligible_validated_user(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (translator, _) = sign_in_with_roles(&pool, "translator-1", &["translator"]).await;
    let (unvalidated, _) = sign_in(&pool, "newcomer").await;
    let project = create_project(&pool, &owner_token, "Eligibility").await;
    let id = project["id"].as_i64().unwrap();

    // Wrong role for proofreading.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/proofreading/assignee"),
        json!({ "user_id": translator.id }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Not validated.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/assignee"),
        json!({ "user_id": unvalidated.id }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown user.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/assignee"),
        json!({ "user_id": 999_999 }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The eligible list only offers the translator.
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/eligible"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![translator.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unassign_removes_access(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (translator, translator_token) =
        sign_in_with_roles(&pool, "translator-1", &["translator"]).await;
    let project = create_project(&pool, &owner_token, "Temporary").await;
    let id = project["id"].as_i64().unwrap();
    let assignee_uri = format!("/api/v1/projects/{id}/phases/translation/assignee");

    let app = common::build_test_app(pool.clone());
    put_json_auth(app, &assignee_uri, json!({ "user_id": translator.id }), &owner_token).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &assignee_uri, json!({ "user_id": null }), &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assignments"], json!({}));

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &translator_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_list_reflects_mutations(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (translator, translator_token) =
        sign_in_with_roles(&pool, "translator-1", &["translator"]).await;

    // One app instance so the list cache is shared across requests.
    let app = common::build_test_app(pool.clone());

    let response = get_auth(app.clone(), "/api/v1/projects", &translator_token).await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        json!({ "name": "Cached", "source_language": "en", "target_languages": ["fr"] }),
        &owner_token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), "/api/v1/projects", &owner_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["current_phase_status"], "not_started");

    // Assignment must show up in the translator's previously cached list.
    put_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{id}/phases/translation/assignee"),
        json!({ "user_id": translator.id }),
        &owner_token,
    )
    .await;
    let response = get_auth(app.clone(), "/api/v1/projects", &translator_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], id);

    // Status change must show up in the owner's cached list.
    put_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{id}/phases/translation/status"),
        json!({ "status": "in_progress" }),
        &owner_token,
    )
    .await;
    let response = get_auth(app.clone(), "/api/v1/projects", &owner_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["current_phase_status"], "in_progress");

    // Filters bypass the cache.
    let response = get_auth(
        app.clone(),
        "/api/v1/projects?phase=proofreading",
        &owner_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"], json!([]));

    delete_auth(app.clone(), &format!("/api/v1/projects/{id}"), &owner_token).await;
    let response = get_auth(app, "/api/v1/projects", &owner_token).await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn videos_follow_project_access(pool: PgPool) {
    let (_, owner_token) = sign_in(&pool, "owner-1").await;
    let (translator, translator_token) =
        sign_in_with_roles(&pool, "translator-1", &["translator"]).await;
    let project = create_project(&pool, &owner_token, "With videos").await;
    let id = project["id"].as_i64().unwrap();
    let videos_uri = format!("/api/v1/projects/{id}/videos");

    let app = common::build_test_app(pool.clone());
    put_json_auth(
        app,
        &format!("/api/v1/projects/{id}/phases/translation/assignee"),
        json!({ "user_id": translator.id }),
        &owner_token,
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &videos_uri,
        json!({
            "title": "Episode 1",
            "source_file_name": "ep1.mp4",
            "source_file_url": "https://files.example.com/ep1.mp4",
            "source_file_size_bytes": 1048576
        }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let video = body_json(response).await["data"].clone();
    let video_id = video["id"].as_i64().unwrap();
    assert_eq!(video["project_id"], id);

    // Assignees cannot add videos.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &videos_uri, json!({ "title": "Episode 2" }), &translator_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // But they can attach a translated file.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("{videos_uri}/{video_id}"),
        json!({
            "translated_file_name": "ep1.es.srt",
            "translated_file_url": "https://files.example.com/ep1.es.srt"
        }),
        &translator_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["translated_file_name"], "ep1.es.srt");
    assert_eq!(json["data"]["title"], "Episode 1");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &videos_uri, &translator_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/projects/{id}"), &translator_token).await;
    assert_eq!(body_json(response).await["data"]["video_count"], 1);

    // Deleting the project takes its videos with it.
    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/projects/{id}"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{videos_uri}/{video_id}"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE project_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
