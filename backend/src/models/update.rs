//! Announcement-style updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Update {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    pub kind: UpdateKind,
    pub link: Option<String>,
    pub status: UpdateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Update {
    pub fn new(
        creator_id: String,
        title: String,
        description: String,
        kind: UpdateKind,
        link: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            creator_id,
            title,
            description,
            kind,
            link,
            status: UpdateStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Category of an update. Stored snake_case, serialized with the
/// display labels the API clients expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum UpdateKind {
    #[sqlx(rename = "announcement")]
    Announcement,
    #[sqlx(rename = "new_feature")]
    NewFeature,
    #[sqlx(rename = "event")]
    Event,
    #[sqlx(rename = "other")]
    Other,
}

impl UpdateKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            UpdateKind::Announcement => "Announcement",
            UpdateKind::NewFeature => "New Feature",
            UpdateKind::Event => "Event",
            UpdateKind::Other => "Other",
        }
    }
}

impl Serialize for UpdateKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for UpdateKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "Announcement" | "announcement" => Ok(UpdateKind::Announcement),
            "New Feature" | "new_feature" => Ok(UpdateKind::NewFeature),
            "Event" | "event" => Ok(UpdateKind::Event),
            "Other" | "other" => Ok(UpdateKind::Other),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["Announcement", "New Feature", "Event", "Other"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum UpdateStatus {
    #[sqlx(rename = "active")]
    Active,
    #[sqlx(rename = "inactive")]
    Inactive,
}

impl UpdateStatus {
    pub fn as_label(&self) -> &'static str {
        match self {
            UpdateStatus::Active => "Active",
            UpdateStatus::Inactive => "Inactive",
        }
    }
}

impl Serialize for UpdateStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for UpdateStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "Active" | "active" => Ok(UpdateStatus::Active),
            "Inactive" | "inactive" => Ok(UpdateStatus::Inactive),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["Active", "Inactive"],
            )),
        }
    }
}

/// Payload for creating an update; required fields checked in the handler
/// so missing values surface as a validation error, not a decode failure.
#[derive(Debug, Deserialize)]
pub struct CreateUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UpdateKind>,
    pub link: Option<String>,
}

/// Payload for editing an update's content.
#[derive(Debug, Deserialize)]
pub struct EditUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UpdateKind>,
}
