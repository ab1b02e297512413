//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /status                  -> status
/// POST /initialize              -> initialize
/// GET  /projects                -> list_projects
/// GET  /users                   -> list_users
/// PUT  /users/{id}/roles        -> set_roles
/// PUT  /users/{id}/validation   -> set_validation
/// POST /users/{id}/promote      -> promote
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(admin::status))
        .route("/initialize", post(admin::initialize))
        .route("/projects", get(admin::list_projects))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/roles", put(admin::set_roles))
        .route("/users/{id}/validation", put(admin::set_validation))
        .route("/users/{id}/promote", post(admin::promote))
}
