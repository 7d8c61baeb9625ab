//! Update (announcement) store. Write operations are creator-scoped in
//! the statement itself so a non-owner can never tell an existing id
//! apart from a missing one.

use async_trait::async_trait;
use sqlx::PgPool;

use super::StoreError;
use crate::models::update::{Update, UpdateKind, UpdateStatus};

const UPDATE_COLUMNS: &str =
    "id, creator_id, title, description, kind, link, status, created_at, updated_at";

#[async_trait]
pub trait UpdateStore: Send + Sync {
    async fn insert(&self, update: &Update) -> Result<(), StoreError>;

    /// All active updates, newest first.
    async fn list_active(&self) -> Result<Vec<Update>, StoreError>;

    /// Active updates belonging to one creator, newest first.
    async fn list_active_by_creator(&self, creator_id: &str) -> Result<Vec<Update>, StoreError>;

    async fn find_active_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<Update>, StoreError>;

    async fn edit(
        &self,
        id: &str,
        creator_id: &str,
        title: &str,
        description: &str,
        kind: UpdateKind,
    ) -> Result<Option<Update>, StoreError>;

    async fn set_status(
        &self,
        id: &str,
        creator_id: &str,
        status: UpdateStatus,
    ) -> Result<Option<Update>, StoreError>;

    async fn delete(&self, id: &str, creator_id: &str) -> Result<Option<Update>, StoreError>;
}

#[derive(Clone)]
pub struct PgUpdateStore {
    pool: PgPool,
}

impl PgUpdateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UpdateStore for PgUpdateStore {
    async fn insert(&self, update: &Update) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO updates (id, creator_id, title, description, kind, link, status, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&update.id)
        .bind(&update.creator_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.kind)
        .bind(&update.link)
        .bind(update.status)
        .bind(update.created_at)
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Update>, StoreError> {
        let updates = sqlx::query_as::<_, Update>(&format!(
            "SELECT {UPDATE_COLUMNS} FROM updates WHERE status = 'active' \
             ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(updates)
    }

    async fn list_active_by_creator(&self, creator_id: &str) -> Result<Vec<Update>, StoreError> {
        let updates = sqlx::query_as::<_, Update>(&format!(
            "SELECT {UPDATE_COLUMNS} FROM updates WHERE status = 'active' AND creator_id = $1 \
             ORDER BY created_at DESC, id"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(updates)
    }

    async fn find_active_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<Update>, StoreError> {
        let update = sqlx::query_as::<_, Update>(&format!(
            "SELECT {UPDATE_COLUMNS} FROM updates \
             WHERE id = $1 AND creator_id = $2 AND status = 'active'"
        ))
        .bind(id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(update)
    }

    async fn edit(
        &self,
        id: &str,
        creator_id: &str,
        title: &str,
        description: &str,
        kind: UpdateKind,
    ) -> Result<Option<Update>, StoreError> {
        let update = sqlx::query_as::<_, Update>(&format!(
            "UPDATE updates SET title = $3, description = $4, kind = $5, updated_at = NOW() \
             WHERE id = $1 AND creator_id = $2 RETURNING {UPDATE_COLUMNS}"
        ))
        .bind(id)
        .bind(creator_id)
        .bind(title)
        .bind(description)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(update)
    }

    async fn set_status(
        &self,
        id: &str,
        creator_id: &str,
        status: UpdateStatus,
    ) -> Result<Option<Update>, StoreError> {
        let update = sqlx::query_as::<_, Update>(&format!(
            "UPDATE updates SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND creator_id = $2 RETURNING {UPDATE_COLUMNS}"
        ))
        .bind(id)
        .bind(creator_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(update)
    }

    async fn delete(&self, id: &str, creator_id: &str) -> Result<Option<Update>, StoreError> {
        let update = sqlx::query_as::<_, Update>(&format!(
            "DELETE FROM updates WHERE id = $1 AND creator_id = $2 RETURNING {UPDATE_COLUMNS}"
        ))
        .bind(id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(update)
    }
}
