//! Event postings with a flyer and a photo gallery. Images pass through
//! the media store; the database only ever holds stored references.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::{bad_multipart, read_image_field, MessageResponse};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::event::{Event, EventFilter, MAX_EVENT_PHOTOS};
use crate::state::AppState;
use crate::utils::media::UploadedImage;

#[derive(Default)]
struct EventForm {
    title: Option<String>,
    description: Option<String>,
    flyer: Option<UploadedImage>,
    photos: Vec<UploadedImage>,
    remove_photos: Vec<String>,
}

async fn read_event_form(mut multipart: Multipart) -> Result<EventForm, AppError> {
    let mut form = EventForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(bad_multipart)?),
            "description" => form.description = Some(field.text().await.map_err(bad_multipart)?),
            "flyer" => form.flyer = Some(read_image_field(field).await?),
            "photos" => form.photos.push(read_image_field(field).await?),
            "remove_photos" => form
                .remove_photos
                .push(field.text().await.map_err(bad_multipart)?),
            _ => {}
        }
    }
    Ok(form)
}

fn require_images(uploads: &[&UploadedImage], errors: &mut Vec<String>, field: &str) {
    if uploads.iter().any(|upload| !upload.is_image()) {
        errors.push(format!("{}: must be an image", field));
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let form = read_event_form(multipart).await?;

    let mut errors = Vec::new();
    let title = form.title.unwrap_or_default();
    let description = form.description.unwrap_or_default();
    if title.trim().is_empty() {
        errors.push("title: required".to_string());
    }
    if description.trim().is_empty() {
        errors.push("description: required".to_string());
    }
    match form.flyer {
        Some(ref flyer) => require_images(&[flyer], &mut errors, "flyer"),
        None => errors.push("flyer: required".to_string()),
    }
    if form.photos.is_empty() || form.photos.len() > MAX_EVENT_PHOTOS {
        errors.push(format!("photos: between 1 and {} required", MAX_EVENT_PHOTOS));
    }
    require_images(&form.photos.iter().collect::<Vec<_>>(), &mut errors, "photos");
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let flyer = state
        .media
        .store(form.flyer.as_ref().expect("validated above"))
        .await?;
    let mut photos = Vec::with_capacity(form.photos.len());
    for photo in &form.photos {
        photos.push(state.media.store(photo).await?);
    }

    let event = Event::new(user_id, title, description, flyer, photos);
    state.events.insert(&event).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.events.list(filter.featured).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;
    Ok(Json(event))
}

/// Merges the submitted fields into the event: replace the flyer,
/// append photos, drop photos named in `remove_photos`. The gallery
/// must stay within 1..=12 afterwards.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Event>, AppError> {
    let form = read_event_form(multipart).await?;

    let mut event = state
        .events
        .find_by_id(&id)
        .await?
        .filter(|event| event.creator_id == user_id)
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;

    let mut errors = Vec::new();
    if let Some(ref flyer) = form.flyer {
        require_images(&[flyer], &mut errors, "flyer");
    }
    require_images(&form.photos.iter().collect::<Vec<_>>(), &mut errors, "photos");
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if let Some(title) = form.title {
        event.title = title;
    }
    if let Some(description) = form.description {
        event.description = description;
    }

    let mut removed_media = Vec::new();

    if !form.remove_photos.is_empty() {
        event.photos.retain(|stored| {
            if form.remove_photos.contains(stored) {
                removed_media.push(stored.clone());
                false
            } else {
                true
            }
        });
    }

    for photo in &form.photos {
        event.photos.push(state.media.store(photo).await?);
    }

    if event.photos.is_empty() || event.photos.len() > MAX_EVENT_PHOTOS {
        return Err(AppError::BadRequest(format!(
            "An event must have between 1 and {} photos.",
            MAX_EVENT_PHOTOS
        )));
    }

    if let Some(ref flyer) = form.flyer {
        removed_media.push(event.flyer.clone());
        event.flyer = state.media.store(flyer).await?;
    }

    let changed = state.events.update(&event).await?;
    if !changed {
        return Err(AppError::NotFound("Event not found.".to_string()));
    }

    for stored in removed_media {
        if let Err(err) = state.media.remove(&stored).await {
            tracing::warn!("Failed to remove event media: {:?}", err);
        }
    }

    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let event = state
        .events
        .find_by_id(&id)
        .await?
        .filter(|event| event.creator_id == user_id)
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;

    state.events.delete(&event.id).await?;

    for stored in std::iter::once(&event.flyer).chain(event.photos.iter()) {
        if let Err(err) = state.media.remove(stored).await {
            tracing::warn!("Failed to remove event media: {:?}", err);
        }
    }

    Ok(Json(MessageResponse::new("Event deleted successfully.")))
}

pub async fn feature_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    set_featured(&state, &id, &user_id, true).await
}

pub async fn unfeature_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    set_featured(&state, &id, &user_id, false).await
}

async fn set_featured(
    state: &AppState,
    id: &str,
    user_id: &str,
    featured: bool,
) -> Result<Json<Event>, AppError> {
    let event = state
        .events
        .set_featured(id, user_id, featured)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;
    Ok(Json(event))
}
