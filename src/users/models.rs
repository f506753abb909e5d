use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record as held by the store.
///
/// `password_hash` never leaves the persistence/service boundary; anything
/// returned over the API is the `AuthUser` projection.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Fields needed to create a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Public projection of a user. This is the only user shape that crosses
/// the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&StoredUser> for AuthUser {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}
