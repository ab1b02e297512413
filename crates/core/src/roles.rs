//! Well-known role names and helpers for role lists.
//!
//! These must match the `CHECK` constraint on `users.roles` in
//! `20260301000001_create_users.sql`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TRANSLATOR: &str = "translator";
pub const ROLE_REVIEWER: &str = "reviewer";
pub const ROLE_AUDIO_PRODUCER: &str = "audio_producer";
pub const ROLE_USER: &str = "user";

pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_TRANSLATOR,
    ROLE_REVIEWER,
    ROLE_AUDIO_PRODUCER,
    ROLE_USER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Translator,
    Reviewer,
    AudioProducer,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Translator => ROLE_TRANSLATOR,
            Role::Reviewer => ROLE_REVIEWER,
            Role::AudioProducer => ROLE_AUDIO_PRODUCER,
            Role::User => ROLE_USER,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_TRANSLATOR => Ok(Role::Translator),
            ROLE_REVIEWER => Ok(Role::Reviewer),
            ROLE_AUDIO_PRODUCER => Ok(Role::AudioProducer),
            ROLE_USER => Ok(Role::User),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

/// Parse and canonicalize a stored role list.
///
/// The result is deduplicated, ordered, and always contains [`Role::User`],
/// so every profile carries the implicit base role regardless of what was
/// persisted.
pub fn normalize_roles<S: AsRef<str>>(roles: &[S]) -> Result<Vec<Role>, CoreError> {
    let mut parsed = roles
        .iter()
        .map(|r| r.as_ref().trim().parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;
    parsed.push(Role::User);
    parsed.sort();
    parsed.dedup();
    Ok(parsed)
}

/// Storage form of a normalized role list.
pub fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

/// Whether a stored role list contains `role`. `user` is always implied.
pub fn has_role<S: AsRef<str>>(roles: &[S], role: Role) -> bool {
    role == Role::User || roles.iter().any(|r| r.as_ref() == role.as_str())
}

pub fn is_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    has_role(roles, Role::Admin)
}
