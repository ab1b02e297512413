pub mod admin;
pub mod health;
pub mod meta;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /meta/languages                                  language registry (public)
/// /meta/workflow                                   phases, roles, transitions (public)
///
/// /me                                              get, create-or-update own profile
///
/// /projects                                        list mine, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/phases/{phase}/status             set phase status (PUT)
/// /projects/{id}/phases/{phase}/assignee           assign / unassign (PUT)
/// /projects/{id}/phases/{phase}/eligible           eligible assignees (GET)
/// /projects/{project_id}/videos                    list, create
/// /projects/{project_id}/videos/{id}               get, update, delete
///
/// /admin/status                                    whether an admin exists
/// /admin/initialize                                bootstrap first admin (POST)
/// /admin/projects                                  all projects (admin only)
/// /admin/users                                     list / filter by role (admin only)
/// /admin/users/{id}/roles                          set roles (PUT)
/// /admin/users/{id}/validation                     set validation flag (PUT)
/// /admin/users/{id}/promote                        promote to admin (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/meta", meta::router())
        .merge(user::router())
        .nest("/projects", project::router())
        .nest("/admin", admin::router())
}
