//! Capability keys gating access to the whole API.

use anyhow::Context;
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::security::generate_token;

/// Length of the random key material in bytes (hex-encoded on the wire).
const API_KEY_BYTES: usize = 10;

#[derive(Debug, Clone, FromRow)]
pub struct ApiKey {
    pub id: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Mints a fresh key expiring one calendar month from now.
    pub fn mint() -> anyhow::Result<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_months(Months::new(1))
            .context("API key expiry out of range")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            key: generate_token(API_KEY_BYTES),
            expires_at,
            created_at: now,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub message: String,
    pub api_key: String,
    pub expires_at: DateTime<Utc>,
}
