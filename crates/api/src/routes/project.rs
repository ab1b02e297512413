//! Route definitions for the `/projects` resource.
//!
//! Also nests phase and video routes under `/projects/{id}/...`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{phase, project, video};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// PUT    /{id}/phases/{phase}/status        -> set_status
/// PUT    /{id}/phases/{phase}/assignee      -> set_assignee
/// GET    /{id}/phases/{phase}/eligible      -> eligible_assignees
///
/// GET    /{project_id}/videos               -> list_by_project
/// POST   /{project_id}/videos               -> create
/// GET    /{project_id}/videos/{id}          -> get_by_id
/// PUT    /{project_id}/videos/{id}          -> update
/// DELETE /{project_id}/videos/{id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    let video_routes = Router::new()
        .route("/", get(video::list_by_project).post(video::create))
        .route(
            "/{id}",
            get(video::get_by_id)
                .put(video::update)
                .delete(video::delete),
        );

    let phase_routes = Router::new()
        .route("/{phase}/status", put(phase::set_status))
        .route("/{phase}/assignee", put(phase::set_assignee))
        .route("/{phase}/eligible", get(phase::eligible_assignees));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{id}/phases", phase_routes)
        .nest("/{project_id}/videos", video_routes)
}
