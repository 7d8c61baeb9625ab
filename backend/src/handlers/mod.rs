pub mod api_key;
pub mod auth;
pub mod events;
pub mod health;
pub mod updates;

use axum::extract::multipart::{Field, MultipartError};
use serde::Serialize;

use crate::error::AppError;
use crate::utils::media::UploadedImage;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart payload: {}", err))
}

/// Reads a file part into an in-memory upload. Content-type checks
/// happen later, alongside the rest of the payload validation.
pub(crate) async fn read_image_field(field: Field<'_>) -> Result<UploadedImage, AppError> {
    let file_name = field.file_name().unwrap_or("upload.bin").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(bad_multipart)?;
    Ok(UploadedImage {
        file_name,
        content_type,
        bytes,
    })
}
