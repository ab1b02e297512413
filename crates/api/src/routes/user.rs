//! Route definitions for the caller's own profile.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// ```text
/// GET /me  -> get_me
/// PUT /me  -> put_me
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(user::get_me).put(user::put_me))
}
