use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::user::EMAIL_REGEX;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(EMAIL_REGEX).expect("EMAIL_REGEX is a valid pattern");
}

/// User validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UserError {
    #[error("User name cannot be empty")]
    EmptyName,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
}

/// Check an email address against `EMAIL_REGEX`
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), UserError> {
    debug!("Validating email address");

    if !is_valid_email(email) {
        return Err(UserError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Names must contain something other than whitespace
pub fn validate_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::EmptyName);
    }

    Ok(())
}
