/// Input validators for the authentication endpoints.
///
/// The service layer assumes its inputs are well formed; these checks run
/// in the route handlers before any store or hashing work happens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AuthError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_USERNAME_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address: trims, bounds length, checks format.
pub fn is_valid_email(email: &str) -> Result<String, AuthError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::Validation(format!(
            "Email is too long (maximum {} characters)",
            MAX_EMAIL_LENGTH
        )));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(AuthError::Validation("Email has invalid format".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a username: non-empty, bounded, no control characters.
pub fn is_valid_username(username: &str) -> Result<String, AuthError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Username is too long (maximum {} characters)",
            MAX_USERNAME_LENGTH
        )));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(AuthError::Validation(
            "Username contains invalid characters".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validates password length bounds. The upper bound guards against
/// hashing cost abuse with oversized inputs.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password is too long (maximum {} characters)",
            MAX_PASSWORD_LENGTH
        )));
    }

    Ok(())
}
