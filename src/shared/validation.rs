use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

use crate::core::error::AppError;

lazy_static! {
    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Convert `validator` output into a single 400 error.
///
/// Fields failing a `required` rule are listed together
/// ("Missing required fields: location, title"); other failures contribute their
/// own message. Fields are sorted so the message is stable.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for (field, field_errors) in fields {
        for error in field_errors.iter() {
            if error.code == "required" {
                missing.push(field.to_string());
            } else {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                invalid.push(message);
            }
        }
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("Missing required fields: {}", missing.join(", ")));
    }
    parts.extend(invalid);

    AppError::Validation(parts.join("; "))
}

/// Treat blank form input as absent
pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
