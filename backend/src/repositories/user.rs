//! User store: credential records and their state transitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{map_unique_email, StoreError};
use crate::models::user::{ProfileChanges, User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, profile_image, \
     session_token, verified, verification_code, reset_token_hash, reset_token_expires_at, \
     created_at, updated_at";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Newest-first page of users plus the total count.
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), StoreError>;

    /// Flips `verified` and clears the code, conditional on the account
    /// being unverified and the code matching. Returns whether a row changed.
    async fn mark_verified(&self, email: &str, code: &str) -> Result<bool, StoreError>;

    /// Stores a fresh verification code, conditional on the account
    /// still being unverified.
    async fn replace_verification_code(&self, email: &str, code: &str)
        -> Result<bool, StoreError>;

    /// Sets or clears the single session slot.
    async fn set_session_token(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<bool, StoreError>;

    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Consumes an outstanding reset token: matches by hash and expiry,
    /// stores the new password hash and clears the reset fields, all in
    /// one statement. Returns whether a row changed.
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Applies the given changes in one statement; `None` fields keep
    /// their current value. Returns the updated row.
    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Hard delete; returns the removed row.
    async fn delete(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Clears reset fields whose expiry has passed. Used by the cleanup bin.
    async fn clear_expired_reset_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, profile_image, \
             session_token, verified, verification_code, reset_token_hash, \
             reset_token_expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_image)
        .bind(&user.session_token)
        .bind(user.verified)
        .bind(&user.verification_code)
        .bind(&user.reset_token_hash)
        .bind(user.reset_token_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_email)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    async fn mark_verified(&self, email: &str, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET verified = TRUE, verification_code = NULL, updated_at = NOW() \
             WHERE email = $1 AND verified = FALSE AND verification_code = $2",
        )
        .bind(email)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_verification_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET verification_code = $2, updated_at = NOW() \
             WHERE email = $1 AND verified = FALSE",
        )
        .bind(email)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_session_token(
        &self,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET session_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token_hash = NULL, \
             reset_token_expires_at = NULL, updated_at = NOW() \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > $3",
        )
        .bind(token_hash)
        .bind(new_password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
             first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), \
             email = COALESCE($4, email), \
             password_hash = COALESCE($5, password_hash), \
             profile_image = COALESCE($6, profile_image), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.profile_image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)?;

        Ok(user)
    }

    async fn delete(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn clear_expired_reset_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token_hash = NULL, reset_token_expires_at = NULL \
             WHERE reset_token_expires_at IS NOT NULL AND reset_token_expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
