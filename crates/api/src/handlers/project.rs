//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use tflow_core::access::ProjectAccess;
use tflow_core::error::CoreError;
use tflow_core::project::{normalize_languages, validate_description, validate_name};
use tflow_core::retry::retry_read;
use tflow_core::types::DbId;
use tflow_core::workflow::{next_action_for, PhaseAssignments};
use tflow_db::models::project::{
    decode_phases, CreateProject, ProjectDetail, ProjectFilter, ProjectSummary,
    ProjectWithPhases, UpdateProject,
};
use tflow_db::repositories::{ProjectRepo, VideoRepo};
use validator::Validate;

use crate::error::{is_transient_sqlx_error, AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::rbac::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared helpers (also used by phase and video handlers)
// ---------------------------------------------------------------------------

/// Load a project with its phases, or 404.
pub(crate) async fn load_project(state: &AppState, id: DbId) -> AppResult<ProjectWithPhases> {
    retry_read(
        "projects.find_with_phases",
        &state.read_retry,
        is_transient_sqlx_error,
        || ProjectRepo::find_with_phases(&state.pool, id),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    }))
}

/// Assignment map of a loaded project, for access checks.
pub(crate) fn assignments_of(project: &ProjectWithPhases) -> AppResult<PhaseAssignments> {
    let (_, assignments) = decode_phases(&project.phases)?;
    Ok(assignments)
}

pub(crate) fn access_for<'a>(
    project: &ProjectWithPhases,
    assignments: &'a PhaseAssignments,
) -> ProjectAccess<'a> {
    ProjectAccess {
        created_by: project.project.created_by,
        owner_id: project.project.owner_id,
        assignments,
    }
}

/// Decode a project for the response, with the viewer's next action.
pub(crate) fn to_detail(project: ProjectWithPhases, viewer_id: DbId) -> AppResult<ProjectDetail> {
    let mut detail = ProjectDetail::try_from(project)?;
    detail.next_action = next_action_for(&detail.phases, &detail.assignments, viewer_id);
    Ok(detail)
}

fn is_unfiltered(filter: &ProjectFilter) -> bool {
    filter.phase.is_none()
        && filter
            .search
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// The caller becomes creator and owner. All four phases start
/// `not_started` and the current phase is the first one.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectDetail>>)> {
    input.validate()?;
    validate_name(&input.name)?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    let (source_language, target_languages) =
        normalize_languages(&input.source_language, &input.target_languages)?;
    let input = CreateProject {
        source_language,
        target_languages,
        ..input
    };

    let created = ProjectRepo::create(&state.pool, user.id, &input).await?;
    state.invalidate_project_lists();

    tracing::info!(
        project_id = created.project.id,
        user_id = user.id,
        source_language = %created.project.source_language,
        "Project created"
    );

    let detail = to_detail(created, user.id)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/projects
///
/// Projects the caller owns, created, or is assigned to. Unfiltered
/// listings are served from the per-user cache.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<DataResponse<Vec<ProjectSummary>>>> {
    let cacheable = is_unfiltered(&filter);
    let seen = state.project_cache.generation();

    if cacheable {
        if let Some(cached) = state.project_cache.get(&user.id).await {
            tracing::debug!(user_id = user.id, "Project list served from cache");
            return Ok(Json(DataResponse { data: cached }));
        }
    }

    let projects = retry_read(
        "projects.list_for_user",
        &state.read_retry,
        is_transient_sqlx_error,
        || ProjectRepo::list_for_user(&state.pool, user.id, &filter),
    )
    .await?;
    let summaries = retry_read(
        "projects.summaries",
        &state.read_retry,
        is_transient_sqlx_error,
        || ProjectRepo::summaries(&state.pool, &projects),
    )
    .await?;

    if cacheable
        && !state
            .project_cache
            .set_if_current(user.id, summaries.clone(), seen)
            .await
    {
        tracing::debug!(user_id = user.id, "Project list changed while loading, not cached");
    }

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/projects/{id}
///
/// The detail also carries the project's video count.
pub async fn get_by_id(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let project = load_project(&state, id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_read(&current.actor())?;

    let video_count = retry_read(
        "videos.count_by_project",
        &state.read_retry,
        is_transient_sqlx_error,
        || VideoRepo::count_by_project(&state.pool, id),
    )
    .await?;

    let mut detail = to_detail(project, current.0.id)?;
    detail.video_count = Some(video_count);
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/projects/{id}
///
/// Only non-`None` fields are applied. Changing either side of the
/// language pair re-validates the whole pair.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    input.validate()?;

    let existing = load_project(&state, id).await?;
    let assignments = assignments_of(&existing)?;
    access_for(&existing, &assignments).ensure_manage(&current.actor())?;

    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }

    let mut input = input;
    if input.source_language.is_some() || input.target_languages.is_some() {
        let source = input
            .source_language
            .as_deref()
            .unwrap_or(existing.project.source_language.as_str());
        let targets = input
            .target_languages
            .as_deref()
            .unwrap_or(existing.project.target_languages.as_slice());
        let (source, targets) = normalize_languages(source, targets)?;
        input.source_language = Some(source);
        input.target_languages = Some(targets);
    }

    ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    state.invalidate_project_lists();

    tracing::info!(project_id = id, user_id = current.0.id, "Project updated");

    let detail = to_detail(load_project(&state, id).await?, current.0.id)?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project, its phases, and all of its videos.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = load_project(&state, id).await?;
    let assignments = assignments_of(&existing)?;
    access_for(&existing, &assignments).ensure_manage(&current.actor())?;

    let videos = ProjectRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    state.invalidate_project_lists();

    tracing::info!(
        project_id = id,
        user_id = current.0.id,
        videos_deleted = videos,
        "Project deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
