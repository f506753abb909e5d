use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuthError;
use crate::users::models::{NewUser, StoredUser};
use crate::users::store::UserStore;

/// Postgres-backed user store.
///
/// Uniqueness of email and username is enforced by column constraints; a
/// violation surfaces as `DuplicateUser` via the `From<sqlx::Error>`
/// mapping.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type UserRow = (Uuid, String, String, String, bool);

fn row_to_user(row: UserRow) -> StoredUser {
    let (id, email, username, password_hash, is_active) = row;
    StoredUser {
        id,
        email,
        username,
        password_hash,
        is_active,
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password_hash, is_active FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<StoredUser>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, is_active
            FROM users
            WHERE email = $1 OR username = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password_hash, is_active FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    async fn insert(&self, new_user: NewUser) -> Result<StoredUser, AuthError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, true, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(StoredUser {
            id,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            is_active: true,
        })
    }
}
