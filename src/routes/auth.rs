/// Authentication Routes
///
/// Handles user registration, login, token refresh, profile lookup, and
/// logout. Handlers validate their inputs, delegate policy to
/// `AuthService`, and map failures through the `AuthError` response
/// mapping.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, TokenPair};
use crate::error::AuthError;
use crate::middleware::AuthenticatedUser;
use crate::users::AuthUser;
use crate::validators::{is_valid_email, is_valid_username, validate_password};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// User login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_username: Option<String>,
    pub password: Option<String>,
}

/// Token refresh request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Response for register and login: user projection plus token pair.
#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthUser,
    pub tokens: TokenPair,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub tokens: TokenPair,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: AuthUser,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/register
///
/// # Errors
/// - 400: missing fields, invalid email, or password shorter than 8 chars
/// - 400: email already registered
/// - 500: internal error
pub async fn register(
    form: web::Json<RegisterRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let (email, username, password) = match (&form.email, &form.username, &form.password) {
        (Some(email), Some(username), Some(password)) => (email, username, password),
        _ => {
            return Err(AuthError::Validation(
                "Email, username, and password are required".to_string(),
            ))
        }
    };

    let email = is_valid_email(email)?;
    let username = is_valid_username(username)?;
    validate_password(password)?;

    let (user, tokens) = service.register(&email, &username, password).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        user,
        tokens,
    }))
}

/// POST /api/auth/login
///
/// Accepts either email or username as the identifier.
///
/// # Errors
/// - 400: missing fields
/// - 401: invalid credentials (same message for unknown user and wrong password)
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let (identifier, password) = match (&form.email_or_username, &form.password) {
        (Some(identifier), Some(password)) => (identifier, password),
        _ => {
            return Err(AuthError::Validation(
                "Email/username and password are required".to_string(),
            ))
        }
    };

    let (user, tokens) = service.login(identifier, password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        tokens,
    }))
}

/// POST /api/auth/refresh
///
/// Exchanges a refresh token for a new pair (rotation).
///
/// # Errors
/// - 400: refresh token missing
/// - 401: invalid, expired, or foreign refresh token
/// - 404: subject no longer exists
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let refresh_token = form
        .refresh_token
        .as_ref()
        .ok_or_else(|| AuthError::Validation("Refresh token is required".to_string()))?;

    let tokens = service.refresh(refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        message: "Tokens refreshed successfully".to_string(),
        tokens,
    }))
}

/// GET /api/auth/profile
///
/// Requires a valid access token; identity is injected by the gate.
///
/// # Errors
/// - 401/403: handled by the gate
/// - 404: subject no longer exists in the store
pub async fn profile(
    identity: web::ReqData<AuthenticatedUser>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let user = service
        .get_by_id(identity.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(ProfileResponse { user }))
}

/// POST /api/auth/logout
///
/// Advisory only. Tokens are bearer capabilities with no server-side
/// revocation store, so the client is responsible for discarding them.
pub async fn logout(
    identity: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AuthError> {
    tracing::info!(user_id = %identity.id, "User logged out");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Logout successful. Please remove tokens from client storage.".to_string(),
    }))
}

/// GET /
///
/// Public welcome route. Runs behind the optional gate: an authenticated
/// caller sees their own projection, everyone else just the banner.
pub async fn welcome(identity: Option<web::ReqData<AuthenticatedUser>>) -> HttpResponse {
    let user = identity.map(|identity| AuthUser {
        id: identity.id,
        email: identity.email.clone(),
    });

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to Menu Auth API",
        "user": user,
    }))
}
