//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Role name to filter by.
    pub role: Option<String>,
    /// Page size, clamped via `clamp_limit`.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
