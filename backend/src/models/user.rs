//! Models for user accounts and the authentication payloads around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::media::UploadedImage;

/// Database representation of a user account.
///
/// Never serialized directly; API responses go through [`UserResponse`]
/// so credential and session fields cannot leak.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique lookup key, stored lowercased.
    pub email: String,
    pub password_hash: String,
    /// Stored media reference for the profile image.
    pub profile_image: String,
    /// Single session slot; only the most recently issued token is honored.
    pub session_token: Option<String>,
    pub verified: bool,
    /// 6-digit code, present only while `verified` is false.
    pub verification_code: Option<String>,
    /// SHA-256 hex of the outstanding reset token, if any.
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Constructs a fresh, unverified account.
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        profile_image: String,
        verification_code: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            password_hash,
            profile_image,
            session_token: None,
            verified: false,
            verification_code: Some(verification_code),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` while a password reset is outstanding and unexpired.
    pub fn has_pending_reset(&self, now: DateTime<Utc>) -> bool {
        self.reset_token_hash.is_some()
            && self.reset_token_expires_at.is_some_and(|exp| exp > now)
    }
}

/// Public-facing representation of a user returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_image: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            profile_image: user.profile_image,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration fields collected from the multipart form.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<UploadedImage>,
}

/// Profile changes collected from the multipart form; all fields optional.
#[derive(Debug, Default)]
pub struct UpdateProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_image: Option<UploadedImage>,
}

/// Column-level changes applied to a user row in one statement.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verification_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session token plus the sanitized user record.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email)]
    pub email: String,
}
