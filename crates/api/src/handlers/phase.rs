//! Handlers for `/projects/{id}/phases/{phase}`: status, assignee, and
//! eligible assignees.

use axum::extract::State;
use tflow_core::access::ensure_eligible_for_phase;
use tflow_core::error::CoreError;
use tflow_core::retry::retry_read;
use tflow_core::types::DbId;
use tflow_core::workflow::{eligible_role_for_phase, Phase};
use tflow_db::models::project::{PhaseStatusUpdate, ProjectDetail, SetPhaseAssignee, SetPhaseStatus};
use tflow_db::models::user::User;
use tflow_db::repositories::{ProjectRepo, UserRepo};

use super::project::{access_for, assignments_of, load_project, to_detail};
use crate::error::{is_transient_sqlx_error, AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::rbac::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/projects/{id}/phases/{phase}/status
///
/// Allowed for project managers and the phase's assignee. The transition
/// must be permitted by the workflow; the current phase moves with it.
pub async fn set_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, phase)): Path<(DbId, String)>,
    Json(input): Json<SetPhaseStatus>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let phase: Phase = phase.parse()?;

    let project = load_project(&state, id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_change_phase_status(&current.actor(), phase)?;

    match ProjectRepo::set_phase_status(&state.pool, id, phase, input.status).await? {
        PhaseStatusUpdate::Updated {
            previous_status,
            current_phase,
        } => {
            tracing::info!(
                project_id = id,
                user_id = current.0.id,
                phase = %phase,
                from = %previous_status,
                to = %input.status,
                current_phase = %current_phase,
                "Phase status changed"
            );
        }
        PhaseStatusUpdate::ProjectNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            }));
        }
        PhaseStatusUpdate::Rejected(msg) => {
            return Err(AppError::Core(CoreError::Validation(msg)));
        }
    }
    state.invalidate_project_lists();

    let detail = to_detail(load_project(&state, id).await?, current.0.id)?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/projects/{id}/phases/{phase}/assignee
///
/// `{"user_id": 7}` assigns, `{"user_id": null}` unassigns. The assignee
/// must be validated and hold the phase's role (or be an admin).
pub async fn set_assignee(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, phase)): Path<(DbId, String)>,
    Json(input): Json<SetPhaseAssignee>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let phase: Phase = phase.parse()?;

    let project = load_project(&state, id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_manage(&current.actor())?;

    if let Some(user_id) = input.user_id {
        let assignee = UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }))?;
        ensure_eligible_for_phase(&assignee.roles, assignee.is_validated, phase)?;
    }

    let updated = ProjectRepo::set_phase_assignee(&state.pool, id, phase, input.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    state.invalidate_project_lists();

    match input.user_id {
        Some(user_id) => tracing::info!(
            project_id = id,
            phase = %phase,
            assignee_id = user_id,
            "Phase assigned"
        ),
        None => tracing::info!(project_id = id, phase = %phase, "Phase unassigned"),
    }

    let detail = to_detail(load_project(&state, id).await?, current.0.id)?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/projects/{id}/phases/{phase}/eligible
///
/// Users who could be assigned to the phase.
pub async fn eligible_assignees(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, phase)): Path<(DbId, String)>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let phase: Phase = phase.parse()?;

    let project = load_project(&state, id).await?;
    let assignments = assignments_of(&project)?;
    access_for(&project, &assignments).ensure_read(&current.actor())?;

    let role = eligible_role_for_phase(phase);
    let users = retry_read(
        "users.list_eligible",
        &state.read_retry,
        is_transient_sqlx_error,
        || UserRepo::list_eligible(&state.pool, role),
    )
    .await?;
    Ok(Json(DataResponse { data: users }))
}
