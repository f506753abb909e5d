use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::users::models::{NewUser, StoredUser};
use crate::users::store::UserStore;

/// In-memory user store backed by a `RwLock<HashMap>`.
///
/// Used by the integration tests and available to embedders that do not
/// need durable storage. Uniqueness of email and username is enforced the
/// same way the Postgres store's constraints do.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> AuthError {
        AuthError::Internal("user store lock poisoned".to_string())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<StoredUser>, AuthError> {
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users
            .values()
            .find(|u| u.email == identifier || u.username == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError> {
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<StoredUser, AuthError> {
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;

        if users
            .values()
            .any(|u| u.email == new_user.email || u.username == new_user.username)
        {
            return Err(AuthError::DuplicateUser);
        }

        let user = StoredUser {
            id: Uuid::new_v4(),
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            is_active: true,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }
}
