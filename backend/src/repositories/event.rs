//! Event store: plain CRUD plus creator-scoped featured toggles.

use async_trait::async_trait;
use sqlx::PgPool;

use super::StoreError;
use crate::models::event::Event;

const EVENT_COLUMNS: &str =
    "id, creator_id, title, description, flyer, photos, featured, created_at, updated_at";

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;

    /// Newest-first listing, optionally filtered by the featured flag.
    async fn list(&self, featured: Option<bool>) -> Result<Vec<Event>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, StoreError>;

    /// Replaces the mutable columns of an existing row.
    async fn update(&self, event: &Event) -> Result<bool, StoreError>;

    /// Creator-scoped featured toggle; `None` when the event does not
    /// exist or belongs to someone else.
    async fn set_featured(
        &self,
        id: &str,
        creator_id: &str,
        featured: bool,
    ) -> Result<Option<Event>, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO events (id, creator_id, title, description, flyer, photos, featured, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&event.id)
        .bind(&event.creator_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.flyer)
        .bind(&event.photos)
        .bind(event.featured)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, featured: Option<bool>) -> Result<Vec<Event>, StoreError> {
        let events = match featured {
            Some(flag) => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE featured = $1 \
                     ORDER BY created_at DESC, id"
                ))
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(events)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn update(&self, event: &Event) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE events SET title = $2, description = $3, flyer = $4, photos = $5, \
             featured = $6, updated_at = NOW() WHERE id = $1",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.flyer)
        .bind(&event.photos)
        .bind(event.featured)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_featured(
        &self,
        id: &str,
        creator_id: &str,
        featured: bool,
    ) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET featured = $3, updated_at = NOW() \
             WHERE id = $1 AND creator_id = $2 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(creator_id)
        .bind(featured)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
