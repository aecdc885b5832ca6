//! Shared validation utilities
//!
//! Common validation functions for input data across commands and queries.

use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be between 1 and {max_length} characters")]
    TooLong { field: &'static str, max_length: usize },
}

/// Validate a required name-like field
///
/// Must be non-empty after trimming and no longer than `max_length`.
pub fn validate_name(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), NameValidationError> {
    if value.trim().is_empty() {
        return Err(NameValidationError::Required { field });
    }
    if value.len() > max_length {
        return Err(NameValidationError::TooLong { field, max_length });
    }
    Ok(())
}

/// Access levels accepted by the upload form
pub const VALID_ACCESS_LEVELS: &[&str] = &["public", "private"];

/// Parse an access level string into the stored public flag.
///
/// Returns `Err` with an explanatory message for anything other than
/// "public" or "private".
pub fn parse_access_level(value: &str) -> Result<bool, String> {
    match value {
        "public" => Ok(true),
        "private" => Ok(false),
        other => Err(format!(
            "Invalid access level: {}. Must be one of: {}",
            other,
            VALID_ACCESS_LEVELS.join(", ")
        )),
    }
}

/// Render the stored public flag back as the API access level string.
pub fn access_level_label(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

/// Collaborator roles recognized on research projects
pub const VALID_COLLABORATOR_ROLES: &[&str] = &["viewer", "contributor", "manager"];

/// Validate a collaborator role value
pub fn validate_collaborator_role(role: &str) -> Result<(), String> {
    if role.is_empty() {
        return Err("Role is required".to_string());
    }
    if !VALID_COLLABORATOR_ROLES.contains(&role) {
        return Err(format!(
            "Invalid role: {}. Must be one of: {}",
            role,
            VALID_COLLABORATOR_ROLES.join(", ")
        ));
    }
    Ok(())
}

/// Project lifecycle states
pub const VALID_PROJECT_STATUSES: &[&str] = &["planning", "active", "completed", "archived"];

/// Validate a project status value
pub fn validate_project_status(status: &str) -> Result<(), String> {
    if !VALID_PROJECT_STATUSES.contains(&status) {
        return Err(format!(
            "Invalid status: {}. Must be one of: {}",
            status,
            VALID_PROJECT_STATUSES.join(", ")
        ));
    }
    Ok(())
}
