//! Handlers for videos nested under `/projects/{project_id}/videos`.
//!
//! Anyone who can see the project can list, read, and update its videos
//! (assignees attach translated files). Creating and deleting videos is
//! reserved for those who manage the project.

use axum::extract::State;
use axum::http::StatusCode;
use tflow_core::error::CoreError;
use tflow_core::retry::retry_read;
use tflow_core::types::DbId;
use tflow_core::video::{validate_status, validate_title};
use tflow_db::models::video::{CreateVideo, UpdateVideo, Video};
use tflow_db::repositories::VideoRepo;
use validator::Validate;

use super::project::{access_for, assignments_of, load_project};
use crate::error::{is_transient_sqlx_error, AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::rbac::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn video_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

/// GET /api/v1/projects/{project_id}/videos
pub async fn list_by_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    let project = load_project(&state, project_id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_read(&current.actor())?;

    let videos = retry_read(
        "videos.list_by_project",
        &state.read_retry,
        is_transient_sqlx_error,
        || VideoRepo::list_by_project(&state.pool, project_id),
    )
    .await?;
    Ok(Json(DataResponse { data: videos }))
}

/// POST /api/v1/projects/{project_id}/videos
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateVideo>,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    input.validate()?;
    validate_title(&input.title)?;

    let project = load_project(&state, project_id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_manage(&current.actor())?;

    let video = VideoRepo::create(&state.pool, project_id, current.0.id, &input).await?;
    tracing::info!(project_id, video_id = video.id, "Video created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

/// GET /api/v1/projects/{project_id}/videos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Video>>> {
    let project = load_project(&state, project_id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_read(&current.actor())?;

    let video = retry_read(
        "videos.find_by_id",
        &state.read_retry,
        is_transient_sqlx_error,
        || VideoRepo::find_by_id(&state.pool, project_id, id),
    )
    .await?
    .ok_or_else(|| video_not_found(id))?;
    Ok(Json(DataResponse { data: video }))
}

/// PUT /api/v1/projects/{project_id}/videos/{id}
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<Json<DataResponse<Video>>> {
    input.validate()?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    let project = load_project(&state, project_id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_read(&current.actor())?;

    let video = VideoRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or_else(|| video_not_found(id))?;
    tracing::info!(project_id, video_id = id, status = %video.status, "Video updated");
    Ok(Json(DataResponse { data: video }))
}

/// DELETE /api/v1/projects/{project_id}/videos/{id}
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let project = load_project(&state, project_id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_manage(&current.actor())?;

    if VideoRepo::delete(&state.pool, project_id, id).await? {
        tracing::info!(project_id, video_id = id, "Video deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(video_not_found(id))
    }
}
