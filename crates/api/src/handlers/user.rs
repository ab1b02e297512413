//! Handlers for the caller's own profile (`/me`).

use axum::extract::State;
use tflow_core::error::CoreError;
use tflow_core::languages::canonical_code;
use tflow_db::models::user::{UpdateProfile, UpsertUser, User};
use tflow_db::repositories::UserRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<DataResponse<User>> {
    Json(DataResponse { data: user })
}

/// PUT /api/v1/me
///
/// Creates the profile on first sign-in (identity and email from the token)
/// and applies any profile fields in the body. New profiles start
/// unvalidated with only the `user` role.
pub async fn put_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<User>>> {
    input.validate()?;

    let mut input = input;
    if let Some(languages) = &input.languages {
        input.languages = Some(canonical_languages(languages)?);
    }

    let sign_in = UpsertUser {
        external_id: auth.external_id,
        email: auth.email,
        display_name: auth.name,
    };
    sign_in.validate()?;

    let user = UserRepo::upsert(&state.pool, &sign_in).await?;
    tracing::info!(user_id = user.id, "Profile signed in");

    let has_changes = input.display_name.is_some()
        || input.bio.is_some()
        || input.skills.is_some()
        || input.languages.is_some();
    if !has_changes {
        return Ok(Json(DataResponse { data: user }));
    }

    let user = UserRepo::update_profile(&state.pool, user.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.id,
        }))?;
    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse { data: user }))
}

/// Canonical spellings of a profile's working languages. Unknown codes are
/// rejected.
fn canonical_languages(languages: &[String]) -> Result<Vec<String>, CoreError> {
    languages
        .iter()
        .map(|code| {
            canonical_code(code)
                .map(str::to_string)
                .ok_or_else(|| CoreError::Validation(format!("Unsupported language code '{code}'")))
        })
        .collect()
}
