use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::users::models::{NewUser, StoredUser};

/// Keyed lookup and creation of user records.
///
/// Implementations are shared across request handlers, so they must be
/// `Send + Sync`; any locking or pooling is the store's own concern.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError>;

    /// Look up a user by email or username.
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<StoredUser>, AuthError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError>;

    /// Persist a new user record.
    ///
    /// # Errors
    /// * `DuplicateUser` - email or username already taken
    async fn insert(&self, new_user: NewUser) -> Result<StoredUser, AuthError>;
}
