//! Event postings with an image gallery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Upper bound on gallery photos per event.
pub const MAX_EVENT_PHOTOS: usize = 12;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    /// Stored media reference for the flyer image.
    pub flyer: String,
    /// Stored media references for the gallery.
    pub photos: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        creator_id: String,
        title: String,
        description: String,
        flyer: String,
        photos: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            creator_id,
            title,
            description,
            flyer,
            photos,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Optional filter for event listings.
#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    pub featured: Option<bool>,
}
