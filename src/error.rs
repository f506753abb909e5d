/// Unified Error Handling Module
///
/// Every fallible operation in the crate surfaces an `AuthError`. The
/// actix-web integration maps each variant to an HTTP status code and the
/// stable wire shape `{"error": "<message>"}`. Internal details are logged
/// and never cross the HTTP boundary.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Central error type for the authentication subsystem.
#[derive(Debug)]
pub enum AuthError {
    /// Malformed or missing input, surfaced as 400 with a specific message.
    Validation(String),
    /// Registration attempted with an email that is already taken.
    DuplicateUser,
    /// Login failed. Deliberately covers both "no such user" and "wrong
    /// password" so callers cannot enumerate accounts.
    InvalidCredentials,
    /// No bearer token on a request that requires one.
    MissingToken,
    /// Access token failed signature, issuer/audience, or expiry checks.
    InvalidToken,
    /// Refresh token failed signature, issuer/audience, or expiry checks.
    InvalidRefreshToken,
    /// Authenticated lookup of a subject that no longer exists.
    UserNotFound,
    /// Persistence or other unexpected failure. Logged in full, generic
    /// message to the caller.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "{}", msg),
            AuthError::DuplicateUser => write!(f, "User with this email already exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Access token required"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AuthError {}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AuthError::DuplicateUser
        } else {
            AuthError::Internal(error_msg)
        }
    }
}

impl AuthError {
    /// Message safe to expose on the wire.
    ///
    /// `Internal` is the only variant whose `Display` output differs from
    /// its public message.
    fn public_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::DuplicateUser => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
            other => {
                tracing::warn!(error = %other, "Request failed");
            }
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.public_message(),
        }))
    }
}
