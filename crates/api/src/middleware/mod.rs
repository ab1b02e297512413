//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Verified identity from a JWT Bearer token.
//! - [`rbac::CurrentUser`] -- The caller's stored profile (roles, validation).
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
