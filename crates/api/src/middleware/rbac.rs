//! Role-based access control (RBAC) extractors.
//!
//! Roles are stored on the user profile rather than in the token, so each
//! extractor resolves the caller's profile and then checks it. Use these in
//! route handlers to enforce authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tflow_core::access::Actor;
use tflow_core::error::CoreError;
use tflow_core::retry::retry_read;
use tflow_db::models::user::User;
use tflow_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::{is_transient_sqlx_error, AppError};
use crate::state::AppState;

/// The caller's stored profile. Rejects with 403 if the caller has a valid
/// token but has not completed sign-in (`PUT /api/v1/me`).
///
/// ```ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor<'_> {
        Actor {
            user_id: self.0.id,
            roles: &self.0.roles,
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = retry_read(
            "users.find_by_external_id",
            &state.read_retry,
            is_transient_sqlx_error,
            || UserRepo::find_by_external_id(&state.pool, &auth.external_id),
        )
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "No profile for this account. Complete sign-in with PUT /api/v1/me".into(),
            ))
        })?;
        Ok(CurrentUser(user))
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
