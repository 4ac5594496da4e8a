//! Small field validators shared by the domain modules.
//!
//! Each returns `Err(CoreError::Validation)` with a message naming the field,
//! so handlers can forward them untouched.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Require a non-blank string no longer than `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    max_len(field, value, max)
}

/// Reject strings longer than `max` characters.
pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate an email address.
pub fn validate_email(field: &str, email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    max_len(field, email, 255)
}

/// Validate an absolute http(s) URL.
pub fn validate_http_url(field: &str, url: &str) -> Result<(), CoreError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CoreError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    max_len(field, url, 2048)
}

/// Require `value` to be one of `allowed`.
pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if !allowed.contains(&value) {
        return Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Valid values: {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}
