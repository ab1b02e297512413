//! Handlers for the `/admin` resource.
//!
//! Everything except the bootstrap pair (`status`, `initialize`) requires
//! the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use serde::Serialize;
use tflow_core::error::CoreError;
use tflow_core::retry::retry_read;
use tflow_core::roles::{normalize_roles, role_names, Role};
use tflow_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use tflow_core::types::DbId;
use tflow_db::models::project::{ProjectFilter, ProjectSummary};
use tflow_db::models::user::{SetRoles, SetValidation, User};
use tflow_db::repositories::{ProjectRepo, UserRepo};

use crate::error::{is_transient_sqlx_error, AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{CurrentUser, RequireAdmin};
use crate::query::UserListParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin_exists: bool,
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/status
///
/// Whether any administrator exists. Any signed-in caller may ask.
pub async fn status(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<AdminStatus>>> {
    let admin_exists = retry_read(
        "users.any_admin_exists",
        &state.read_retry,
        is_transient_sqlx_error,
        || UserRepo::any_admin_exists(&state.pool),
    )
    .await?;
    Ok(Json(DataResponse {
        data: AdminStatus { admin_exists },
    }))
}

/// POST /api/v1/admin/initialize
///
/// Promote the caller to admin, but only while no administrator exists.
pub async fn initialize(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<DataResponse<User>>> {
    let promoted = UserRepo::initialize_first_admin(&state.pool, user.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "An administrator already exists".into(),
            ))
        })?;
    tracing::warn!(user_id = promoted.id, "First administrator initialized");
    Ok(Json(DataResponse { data: promoted }))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/projects
pub async fn list_projects(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<DataResponse<Vec<ProjectSummary>>>> {
    let projects = retry_read(
        "projects.list_all",
        &state.read_retry,
        is_transient_sqlx_error,
        || ProjectRepo::list_all(&state.pool, &filter),
    )
    .await?;
    let summaries = retry_read(
        "projects.summaries",
        &state.read_retry,
        is_transient_sqlx_error,
        || ProjectRepo::summaries(&state.pool, &projects),
    )
    .await?;
    Ok(Json(DataResponse { data: summaries }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users?role=&limit=&offset=
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Page<User>>>> {
    let role: Option<Role> = params
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| r.trim().parse())
        .transpose()?;
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let (items, total) = retry_read(
        "users.list",
        &state.read_retry,
        is_transient_sqlx_error,
        || UserRepo::list(&state.pool, role, limit, offset),
    )
    .await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}/roles
///
/// Replace a user's roles. `user` is always kept. Admins cannot drop their
/// own admin role.
pub async fn set_roles(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoles>,
) -> AppResult<Json<DataResponse<User>>> {
    let roles = normalize_roles(&input.roles)?;
    if id == admin.id && !roles.contains(&Role::Admin) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot remove your own admin role".into(),
        )));
    }

    let user = UserRepo::set_roles(&state.pool, id, &role_names(&roles))
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(admin_id = admin.id, user_id = id, roles = ?user.roles, "Roles updated");
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/admin/users/{id}/validation
pub async fn set_validation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetValidation>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::set_validated(&state.pool, id, input.is_validated)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(
        admin_id = admin.id,
        user_id = id,
        is_validated = input.is_validated,
        "Validation flag updated"
    );
    Ok(Json(DataResponse { data: user }))
}

/// POST /api/v1/admin/users/{id}/promote
///
/// Grant the admin role (and validate the account). Idempotent.
pub async fn promote(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::promote_to_admin(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(admin_id = admin.id, user_id = id, "User promoted to admin");
    Ok(Json(DataResponse { data: user }))
}
