/// Token claim sets
///
/// Access and refresh tokens carry distinct claim shapes. Refresh claims
/// hold only the subject id so that an exposed refresh token reveals as
/// little as possible.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::users::AuthUser;

/// Claims embedded in access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// User email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl AccessClaims {
    pub fn new(user: &AuthUser, ttl_seconds: i64, issuer: &str, audience: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: now + ttl_seconds,
            iat: now,
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    /// Extract the subject as a UUID.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Claims embedded in refresh tokens. Subject id only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, ttl_seconds: i64, issuer: &str, audience: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + ttl_seconds,
            iat: now,
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidRefreshToken)
    }
}
