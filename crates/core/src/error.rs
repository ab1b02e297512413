//! Domain error type and the normalized error taxonomy.
//!
//! [`CoreError`] is what domain code returns. [`ErrorKind`] is the small
//! closed set every failure is reduced to before it reaches a client, no
//! matter whether it originated in the domain layer, the database driver, or
//! an external identity provider.

use serde::Serialize;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The normalized kind this error is reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Validation(_) | CoreError::Conflict(_) => ErrorKind::Validation,
            CoreError::Unauthorized(_) => ErrorKind::Authentication,
            CoreError::Forbidden(_) => ErrorKind::PermissionDenied,
            CoreError::Internal(_) => ErrorKind::Server,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized kinds
// ---------------------------------------------------------------------------

/// Message used when a failure carries no usable description.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    PermissionDenied,
    NotFound,
    Validation,
    Network,
    Server,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether an operation failing with this kind may succeed if repeated.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Server)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reduced to its kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub message: String,
    /// The provider code the error was classified from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl NormalizedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }
}

impl From<&CoreError> for NormalizedError {
    fn from(err: &CoreError) -> Self {
        NormalizedError::new(err.kind(), err.to_string())
    }
}

/// Classify a provider error code into an [`ErrorKind`].
///
/// Accepts identity-provider codes (`auth/...`) and document-store codes,
/// with or without a `firestore/` namespace prefix. Unrecognized codes are
/// [`ErrorKind::Unknown`].
pub fn classify_provider_code(code: &str) -> ErrorKind {
    let code = code.trim();
    let code = code.strip_prefix("firestore/").unwrap_or(code);

    if let Some(auth_code) = code.strip_prefix("auth/") {
        return match auth_code {
            "network-request-failed" => ErrorKind::Network,
            "invalid-email" | "weak-password" | "email-already-in-use"
            | "missing-password" => ErrorKind::Validation,
            "internal-error" => ErrorKind::Server,
            _ => ErrorKind::Authentication,
        };
    }

    match code {
        "unauthenticated" => ErrorKind::Authentication,
        "permission-denied" => ErrorKind::PermissionDenied,
        "not-found" => ErrorKind::NotFound,
        "invalid-argument" | "failed-precondition" | "out-of-range" | "already-exists" => {
            ErrorKind::Validation
        }
        "unavailable" | "deadline-exceeded" | "network-error" => ErrorKind::Network,
        "internal" | "data-loss" | "resource-exhausted" | "aborted" => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    }
}

/// Normalize an arbitrary provider failure.
///
/// - A recognized `code` determines the kind.
/// - A message without a code is a generic error: [`ErrorKind::Unknown`],
///   message preserved.
/// - Neither code nor message: [`ErrorKind::Unknown`] with
///   [`DEFAULT_ERROR_MESSAGE`].
pub fn normalize_provider_error(code: Option<&str>, message: Option<&str>) -> NormalizedError {
    let kind = code.map(classify_provider_code).unwrap_or(ErrorKind::Unknown);
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string();

    NormalizedError {
        kind,
        message,
        code: code.map(str::to_string),
    }
}
