//! Account lifecycle: registration, verification, sessions and password
//! resets. Every state transition goes through a single conditional
//! update in the store, so a lost race surfaces as the matching domain
//! error instead of corrupting the row.

use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;
use crate::models::user::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileChanges, RegisterForm,
    ResendVerificationRequest, ResetPasswordRequest, UpdateProfileForm, User, UserResponse,
    VerifyRequest,
};
use crate::models::{PageQuery, Paginated, Pagination};
use crate::repositories::{StoreError, UserStore};
use crate::utils::email::{reset_email_body, verification_email_body, Mailer};
use crate::utils::jwt::{create_session_token, verify_session_token};
use crate::utils::media::MediaStore;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::security::{generate_token, generate_verification_code, sha256_hex};
use crate::validation::rules;

/// Reset tokens are 20 random bytes, sent as 40 hex chars.
const RESET_TOKEN_BYTES: usize = 20;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    media: Arc<dyn MediaStore>,
    config: Config,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaStore>,
        config: Config,
    ) -> Self {
        Self {
            users,
            mailer,
            media,
            config,
        }
    }

    /// Creates an unverified account and mails its 6-digit code. The
    /// record is persisted before the mail goes out; a send failure is
    /// reported but never rolls the account back.
    pub async fn register(&self, form: RegisterForm) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        if form.first_name.trim().is_empty() {
            errors.push("first_name: required".to_string());
        }
        if form.last_name.trim().is_empty() {
            errors.push("last_name: required".to_string());
        }
        if rules::validate_email(&form.email).is_err() {
            errors.push("email: email_invalid".to_string());
        }
        if rules::validate_password(&form.password).is_err() {
            errors.push("password: password_too_short".to_string());
        }
        match form.profile_image {
            Some(ref image) if !image.is_image() => {
                errors.push("profile_image: must be an image".to_string());
            }
            None => errors.push("profile_image: required".to_string()),
            _ => {}
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let email = form.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User already exists with this email.".to_string(),
            ));
        }

        let image = form.profile_image.as_ref().expect("validated above");
        let profile_image = self.media.store(image).await?;

        let password_hash = hash_password(&form.password)?;
        let code = generate_verification_code();
        let user = User::new(
            form.first_name.trim().to_string(),
            form.last_name.trim().to_string(),
            email,
            password_hash,
            profile_image,
            code.clone(),
        );

        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(StoreError::DuplicateEmail) => {
                return Err(AppError::Conflict(
                    "User already exists with this email.".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        self.mailer
            .send(&user.email, "Verify your email", &verification_email_body(&code))?;

        Ok(user.into())
    }

    pub async fn verify(&self, request: VerifyRequest) -> Result<(), AppError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if user.verified {
            return Err(AppError::BadRequest(
                "User is already verified.".to_string(),
            ));
        }

        let changed = self
            .users
            .mark_verified(&email, request.verification_code.trim())
            .await?;
        if !changed {
            return Err(AppError::BadRequest(
                "Invalid verification code.".to_string(),
            ));
        }

        Ok(())
    }

    /// Issues a fresh session token and stores it as the single live
    /// session, invalidating whatever token was there before.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User doesn't exist!".to_string()))?;

        if !user.verified {
            return Err(AppError::BadRequest(
                "Email is not verified. Please verify your email first.".to_string(),
            ));
        }

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::BadRequest(
                "Invalid credentials! Please check your email or password.".to_string(),
            ));
        }

        let token = create_session_token(
            &user.id,
            &self.config.jwt_secret,
            self.config.session_token_expiration_days,
        )?;
        self.users.set_session_token(&user.id, Some(&token)).await?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn logout(&self, user_id: &str) -> Result<(), AppError> {
        let changed = self.users.set_session_token(user_id, None).await?;
        if !changed {
            return Err(AppError::NotFound("User not found.".to_string()));
        }
        Ok(())
    }

    /// Stores the SHA-256 of a fresh reset token and mails the raw
    /// token as a link. Only the hash ever touches the database.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), AppError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist.".to_string()))?;

        let token = generate_token(RESET_TOKEN_BYTES);
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        self.users
            .set_reset_token(&user.id, &sha256_hex(&token), expires_at)
            .await?;

        let reset_url = format!(
            "{}/reset-password?token={}",
            self.config.frontend_url, token
        );
        self.mailer
            .send(&user.email, "Reset your password", &reset_email_body(&reset_url))?;

        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), AppError> {
        if rules::validate_password(&request.new_password).is_err() {
            return Err(AppError::Validation(vec![
                "new_password: password_too_short".to_string(),
            ]));
        }

        let new_hash = hash_password(&request.new_password)?;
        let changed = self
            .users
            .consume_reset_token(&sha256_hex(request.token.trim()), &new_hash, Utc::now())
            .await?;
        if !changed {
            return Err(AppError::BadRequest(
                "Invalid or expired token.".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn resend_verification(
        &self,
        request: ResendVerificationRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if user.verified {
            return Err(AppError::BadRequest("Email already verified.".to_string()));
        }

        let code = generate_verification_code();
        let changed = self.users.replace_verification_code(&email, &code).await?;
        if !changed {
            // Verified concurrently between the read and the update.
            return Err(AppError::BadRequest("Email already verified.".to_string()));
        }

        self.mailer
            .send(&email, "Verify your email", &verification_email_body(&code))?;

        Ok(())
    }

    pub async fn list_users(&self, page: &PageQuery) -> Result<Paginated<UserResponse>, AppError> {
        let (users, total) = self.users.list(page.offset(), page.limit()).await?;
        Ok(Paginated {
            data: users.into_iter().map(UserResponse::from).collect(),
            pagination: Pagination::new(total, page),
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        form: UpdateProfileForm,
    ) -> Result<UserResponse, AppError> {
        let mut errors = Vec::new();
        if let Some(ref email) = form.email {
            if rules::validate_email(email).is_err() {
                errors.push("email: email_invalid".to_string());
            }
        }
        if let Some(ref password) = form.password {
            if rules::validate_password(password).is_err() {
                errors.push("password: password_too_short".to_string());
            }
        }
        if let Some(ref image) = form.profile_image {
            if !image.is_image() {
                errors.push("profile_image: must be an image".to_string());
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let current = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        let email = form.email.map(|e| e.trim().to_lowercase());
        let password_hash = match form.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };
        let profile_image = match form.profile_image {
            Some(ref image) => Some(self.media.store(image).await?),
            None => None,
        };

        let changes = ProfileChanges {
            first_name: form.first_name,
            last_name: form.last_name,
            email,
            password_hash,
            profile_image,
        };

        let updated = self
            .users
            .update_profile(user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if changes.profile_image.is_some() && !current.profile_image.is_empty() {
            if let Err(err) = self.media.remove(&current.profile_image).await {
                tracing::warn!("Failed to remove replaced profile image: {:?}", err);
            }
        }

        Ok(updated.into())
    }

    pub async fn delete_account(&self, user_id: &str) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .delete(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if !user.profile_image.is_empty() {
            if let Err(err) = self.media.remove(&user.profile_image).await {
                tracing::warn!("Failed to remove profile image: {:?}", err);
            }
        }

        Ok(user.into())
    }

    /// Resolves a presented bearer token to its account. The token must
    /// verify cryptographically and still occupy the stored session
    /// slot; logout or a newer login makes older tokens stale.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = verify_session_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::InvalidToken("Invalid token. Please login again.".to_string()))?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::SessionInvalid("Session expired or invalid.".to_string()))?;

        if user.session_token.as_deref() != Some(token) {
            return Err(AppError::SessionInvalid(
                "Session expired or invalid.".to_string(),
            ));
        }

        Ok(user)
    }
}
