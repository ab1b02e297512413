//! User profile model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tflow_core::roles::{normalize_roles, Role};
use tflow_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// Subject identifier assigned by the identity provider.
    #[serde(skip_serializing)]
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub is_validated: bool,
    pub roles: Vec<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_admin(&self) -> bool {
        tflow_core::roles::is_admin(&self.roles)
    }

    pub fn has_role(&self, role: Role) -> bool {
        tflow_core::roles::has_role(&self.roles, role)
    }

    /// Roles in canonical form, always including `user`.
    ///
    /// Stored rows are constrained to known role names, so this only fails
    /// on a corrupted row.
    pub fn normalized_roles(&self) -> Vec<Role> {
        normalize_roles(&self.roles).unwrap_or_else(|_| vec![Role::User])
    }
}

/// Profile data taken from the identity token on sign-in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertUser {
    #[validate(length(min = 1, max = 255))]
    pub external_id: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

/// Self-service profile update. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 50))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 50))]
    pub languages: Option<Vec<String>>,
}

/// Admin request to replace a user's role list.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoles {
    pub roles: Vec<String>,
}

/// Admin request to change a user's validation flag.
#[derive(Debug, Clone, Deserialize)]
pub struct SetValidation {
    pub is_validated: bool,
}
