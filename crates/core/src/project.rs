//! Project field validation.

use crate::error::CoreError;
use crate::languages::{canonical_code, validate_language_pair};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Project name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters (got {})",
            description.chars().count()
        )));
    }
    Ok(())
}

/// Validate a language pair and return it in canonical spelling.
pub fn normalize_languages(
    source: &str,
    targets: &[String],
) -> Result<(String, Vec<String>), CoreError> {
    validate_language_pair(source, targets)?;
    // Both lookups succeed once the pair has validated.
    let source = canonical_code(source).unwrap_or(source).to_string();
    let targets = targets
        .iter()
        .map(|t| canonical_code(t).unwrap_or(t.as_str()).to_string())
        .collect();
    Ok((source, targets))
}
