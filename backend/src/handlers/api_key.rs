use axum::{extract::State, Json};

use crate::error::AppError;
use crate::models::api_key::{ApiKey, ApiKeyResponse};
use crate::state::AppState;

/// Mints a new API key valid for one calendar month.
pub async fn generate_api_key(
    State(state): State<AppState>,
) -> Result<Json<ApiKeyResponse>, AppError> {
    let key = ApiKey::mint()?;
    state.api_keys.insert(&key).await?;

    Ok(Json(ApiKeyResponse {
        message: "API key generated successfully".to_string(),
        api_key: key.key,
        expires_at: key.expires_at,
    }))
}
