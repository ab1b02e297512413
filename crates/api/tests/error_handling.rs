//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values. Database
//! errors that need a real constraint come from a test database.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tflow_api::error::{is_transient_sqlx_error, AppError};
use tflow_core::error::CoreError;
use tflow_db::models::project::CreateProject;
use tflow_db::models::user::UpsertUser;
use tflow_db::repositories::{ProjectRepo, UserRepo};

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["kind"], "not_found");
    assert_eq!(json["error"], "Project with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation(
        "Cannot move a phase from 'completed' to 'in_progress'".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["kind"], "validation");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict(
        "An administrator already exists".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "An administrator already exists");
}

#[tokio::test]
async fn unauthorized_and_forbidden_have_distinct_kinds() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("Missing token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["kind"], "authentication");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("Admin role required".into())))
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["kind"], "permission_denied");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::InternalError("connection string leaked here".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["kind"], "server");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn pool_timeout_is_a_transient_network_error() {
    assert!(is_transient_sqlx_error(&sqlx::Error::PoolTimedOut));
    assert!(!is_transient_sqlx_error(&sqlx::Error::RowNotFound));

    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(json["kind"], "network");
}

#[tokio::test]
async fn validator_errors_become_validation_errors() {
    use validator::Validate;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 1))]
        name: String,
    }

    let errors = Body {
        name: String::new(),
    }
    .validate()
    .unwrap_err();

    let (status, json) = error_to_response(AppError::from(errors)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn primary_key_violation_is_a_conflict(pool: PgPool) {
    let owner = UserRepo::upsert(
        &pool,
        &UpsertUser {
            external_id: "owner-1".to_string(),
            email: "owner-1@example.com".to_string(),
            display_name: None,
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        &pool,
        owner.id,
        &CreateProject {
            name: "Duplicate phases".to_string(),
            description: None,
            source_language: "en".to_string(),
            target_languages: vec!["es".to_string()],
        },
    )
    .await
    .unwrap();

    // The phase row already exists; its key is `project_phases_pkey`.
    let err = sqlx::query("INSERT INTO project_phases (project_id, phase) VALUES ($1, 'translation')")
        .bind(project.project.id)
        .execute(&pool)
        .await
        .unwrap_err();

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["kind"], "validation");
}
