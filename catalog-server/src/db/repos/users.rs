//! User repository
//!
//! Users exist as the actor identity behind the bearer-token check. The
//! stored verifier is the token; see `models::user::derive_token`.

use sqlx::PgPool;

use crate::models::User;

use super::{on_unique_violation, DbError};

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. Duplicate usernames surface as `AlreadyExists` via
    /// the unique constraint rather than a racy check-then-insert.
    pub async fn create(
        &self,
        username: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO users (username, full_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, full_name, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| on_unique_violation(e, "user", username))
    }

    /// Look up the user holding a bearer token (the stored verifier).
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as(
            "SELECT id, username, full_name, password_hash, created_at FROM users WHERE password_hash = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }
}
