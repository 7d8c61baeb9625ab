//! Account endpoints: registration through deletion.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use super::{bad_multipart, read_image_field, MessageResponse};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::user::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterForm, ResendVerificationRequest,
    ResetPasswordRequest, UpdateProfileForm, UserResponse, VerifyRequest,
};
use crate::models::{PageQuery, Paginated};
use crate::state::AppState;

/// Message plus the affected user, used by register/update/delete.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserResponse,
}

async fn read_register_form(mut multipart: Multipart) -> Result<RegisterForm, AppError> {
    let mut form = RegisterForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "first_name" => form.first_name = field.text().await.map_err(bad_multipart)?,
            "last_name" => form.last_name = field.text().await.map_err(bad_multipart)?,
            "email" => form.email = field.text().await.map_err(bad_multipart)?,
            "password" => form.password = field.text().await.map_err(bad_multipart)?,
            "profile_image" => form.profile_image = Some(read_image_field(field).await?),
            _ => {}
        }
    }
    Ok(form)
}

async fn read_profile_form(mut multipart: Multipart) -> Result<UpdateProfileForm, AppError> {
    let mut form = UpdateProfileForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "first_name" => form.first_name = Some(field.text().await.map_err(bad_multipart)?),
            "last_name" => form.last_name = Some(field.text().await.map_err(bad_multipart)?),
            "email" => form.email = Some(field.text().await.map_err(bad_multipart)?),
            "password" => form.password = Some(field.text().await.map_err(bad_multipart)?),
            "profile_image" => form.profile_image = Some(read_image_field(field).await?),
            _ => {}
        }
    }
    Ok(form)
}

pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let form = read_register_form(multipart).await?;
    let user = state.accounts.register(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User registered successfully. Please check your email for the verification code.".to_string(),
            user,
        }),
    ))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.verify(request).await?;
    Ok(Json(MessageResponse::new("Email verified successfully.")))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.accounts.login(request).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.logout(&user_id).await?;
    Ok(Json(MessageResponse::new("Logged out successfully.")))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.forgot_password(request).await?;
    Ok(Json(MessageResponse::new(
        "Password reset link sent to your email.",
    )))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.reset_password(request).await?;
    Ok(Json(MessageResponse::new("Password reset successfully.")))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.resend_verification(request).await?;
    Ok(Json(MessageResponse::new(
        "Verification code resent successfully.",
    )))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    let users = state.accounts.list_users(&page).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.accounts.get_user(&id).await?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<UserEnvelope>, AppError> {
    let form = read_profile_form(multipart).await?;
    let user = state.accounts.update_profile(&user_id, form).await?;

    Ok(Json(UserEnvelope {
        message: "Profile updated successfully.".to_string(),
        user,
    }))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state.accounts.delete_account(&user_id).await?;

    Ok(Json(UserEnvelope {
        message: "User deleted successfully.".to_string(),
        user,
    }))
}
