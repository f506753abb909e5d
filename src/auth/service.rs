/// Authentication Service
///
/// The policy core: registration, login, token refresh, and profile
/// lookup, orchestrating the password hasher, the token codec, and the
/// user store collaborator. Holds no per-request state; the only shared
/// state is the store handle and the codec keys.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{TokenCodec, TokenPair};
use crate::error::AuthError;
use crate::users::{AuthUser, NewUser, UserStore};

pub struct AuthService {
    store: Arc<dyn UserStore>,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new user and issue their first token pair.
    ///
    /// The caller layer has already validated email format and password
    /// length. The duplicate check is a lookup before the write; the store
    /// additionally maps its own unique-constraint violation to
    /// `DuplicateUser`, which closes the race window where two concurrent
    /// registrations pass the lookup.
    ///
    /// # Errors
    /// * `DuplicateUser` - email already registered
    /// * `Internal` - hashing or store failure
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(AuthUser, TokenPair), AuthError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = hash_password(password)?;

        let stored = self
            .store
            .insert(NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
            })
            .await?;

        let user = AuthUser::from(&stored);
        let tokens = self.codec.issue_pair(&user)?;

        tracing::info!(user_id = %user.id, "User registered successfully");

        Ok((user, tokens))
    }

    /// Authenticate by email or username and issue a token pair.
    ///
    /// Unknown identifier, wrong password, and inactive account all
    /// produce the same `InvalidCredentials` failure so that responses
    /// cannot be used to enumerate accounts.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(AuthUser, TokenPair), AuthError> {
        let stored = match self.store.find_by_identifier(identifier).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        if !stored.is_active || !verify_password(password, &stored.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let user = AuthUser::from(&stored);
        let tokens = self.codec.issue_pair(&user)?;

        tracing::info!(user_id = %user.id, "User logged in successfully");

        Ok((user, tokens))
    }

    /// Exchange a refresh token for an entirely new token pair.
    ///
    /// Rotation: a new pair is always minted rather than extending the old
    /// one. There is no revocation store, so the old refresh token stays
    /// usable until its expiry (documented limitation of the stateless
    /// token model).
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - signature, issuer/audience, or expiry check failed
    /// * `UserNotFound` - subject no longer exists or is inactive
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.codec.verify_refresh(refresh_token)?;
        let user_id = claims.user_id()?;

        let stored = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !stored.is_active {
            return Err(AuthError::UserNotFound);
        }

        let user = AuthUser::from(&stored);
        let tokens = self.codec.issue_pair(&user)?;

        tracing::info!(user_id = %user.id, "Token refreshed successfully");

        Ok(tokens)
    }

    /// Look up a user by id and project it.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        Ok(self
            .store
            .find_by_id(id)
            .await?
            .as_ref()
            .map(AuthUser::from))
    }
}
