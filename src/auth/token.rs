/// Token Issuance and Verification
///
/// Signs and verifies the two token kinds with independent secrets.
/// Issuer and audience are fixed system constants checked on every
/// verification, so tokens minted for another deployment never validate
/// here, and the two kinds cannot stand in for each other.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::AuthSettings;
use crate::error::AuthError;
use crate::users::AuthUser;

pub const ISSUER: &str = "menu-auth";
pub const AUDIENCE: &str = "menu-auth-clients";

/// An access/refresh token pair. Field names follow the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies both token kinds.
///
/// Cheap to clone; holds only derived keys and the configured lifetimes.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenCodec {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl: settings.access_token_expiry,
            refresh_ttl: settings.refresh_token_expiry,
        }
    }

    /// Issue an access token for a user.
    pub fn issue_access(&self, user: &AuthUser) -> Result<String, AuthError> {
        let claims = AccessClaims::new(user, self.access_ttl, ISSUER, AUDIENCE);

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Issue a refresh token for a subject id.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        let claims = RefreshClaims::new(user_id, self.refresh_ttl, ISSUER, AUDIENCE);

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: self.issue_refresh(user.id)?,
        })
    }

    /// Validate an access token and extract its claims.
    ///
    /// # Errors
    /// `InvalidToken` on bad signature, wrong issuer/audience, or expiry.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.access_decoding, &strict_validation())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "Access token validation failed");
                AuthError::InvalidToken
            })
    }

    /// Validate a refresh token and extract its claims.
    ///
    /// # Errors
    /// `InvalidRefreshToken` on bad signature, wrong issuer/audience, or
    /// expiry.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &strict_validation())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token validation failed");
                AuthError::InvalidRefreshToken
            })
    }
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);
    validation.leeway = 0;
    validation
}

/// Read the expiry claim without verifying the signature.
///
/// Advisory only; the authoritative check is server-side verification.
pub fn peek_expiry(token: &str) -> Option<i64> {
    #[derive(Deserialize)]
    struct ExpOnly {
        exp: i64,
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpOnly>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}
