//! Announcement updates. The public listing only ever shows Active
//! records; everything creator-scoped answers 404 for records that
//! exist but belong to someone else.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::MessageResponse;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::update::{CreateUpdateRequest, EditUpdateRequest, Update, UpdateStatus};
use crate::state::AppState;

pub async fn create_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(request): Json<CreateUpdateRequest>,
) -> Result<(StatusCode, Json<Update>), AppError> {
    let mut errors = Vec::new();
    if request.title.as_deref().unwrap_or("").trim().is_empty() {
        errors.push("title: required".to_string());
    }
    if request
        .description
        .as_deref()
        .unwrap_or("")
        .trim()
        .is_empty()
    {
        errors.push("description: required".to_string());
    }
    if request.kind.is_none() {
        errors.push("type: required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let update = Update::new(
        user_id,
        request.title.expect("validated above"),
        request.description.expect("validated above"),
        request.kind.expect("validated above"),
        request.link,
    );
    state.updates.insert(&update).await?;

    Ok((StatusCode::CREATED, Json(update)))
}

/// Public listing of all Active updates, newest first.
pub async fn list_updates(State(state): State<AppState>) -> Result<Json<Vec<Update>>, AppError> {
    let updates = state.updates.list_active().await?;
    Ok(Json(updates))
}

pub async fn my_updates(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<Update>>, AppError> {
    let updates = state.updates.list_active_by_creator(&user_id).await?;
    Ok(Json(updates))
}

pub async fn get_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Update>, AppError> {
    let update = state
        .updates
        .find_active_for_creator(&id, &user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Update not found or you are not authorized to view it.".to_string())
        })?;
    Ok(Json(update))
}

pub async fn edit_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<EditUpdateRequest>,
) -> Result<Json<Update>, AppError> {
    let mut errors = Vec::new();
    if request.title.as_deref().unwrap_or("").trim().is_empty() {
        errors.push("title: required".to_string());
    }
    if request
        .description
        .as_deref()
        .unwrap_or("")
        .trim()
        .is_empty()
    {
        errors.push("description: required".to_string());
    }
    if request.kind.is_none() {
        errors.push("type: required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let update = state
        .updates
        .edit(
            &id,
            &user_id,
            request.title.as_deref().expect("validated above"),
            request.description.as_deref().expect("validated above"),
            request.kind.expect("validated above"),
        )
        .await?
        .ok_or_else(not_authorized)?;

    Ok(Json(update))
}

pub async fn disable_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Update>, AppError> {
    let update = state
        .updates
        .set_status(&id, &user_id, UpdateStatus::Inactive)
        .await?
        .ok_or_else(not_authorized)?;
    Ok(Json(update))
}

pub async fn delete_update(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .updates
        .delete(&id, &user_id)
        .await?
        .ok_or_else(not_authorized)?;
    Ok(Json(MessageResponse::new("Update deleted successfully.")))
}

fn not_authorized() -> AppError {
    AppError::NotFound("Update not found or you are not authorized to modify it.".to_string())
}
