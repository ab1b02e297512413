//! Route definitions for `/meta`.

use axum::routing::get;
use axum::Router;

use crate::handlers::meta;
use crate::state::AppState;

/// Routes mounted at `/meta`.
///
/// ```text
/// GET /languages  -> languages
/// GET /workflow   -> workflow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/languages", get(meta::languages))
        .route("/workflow", get(meta::workflow))
}
