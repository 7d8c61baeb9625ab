//! Static API-key gate in front of the whole `/api/v1` surface.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;

/// Rejects requests without a live API key. The three failure modes
/// each get their own message so clients can tell a missing key from a
/// stale one; all of them are 403.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(state.config.api_key_header.as_str())
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Forbidden("API key is required".to_string()))?;

    let key = state
        .api_keys
        .find(presented)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid API key".to_string()))?;

    if key.is_expired(Utc::now()) {
        return Err(AppError::Forbidden("API key has expired".to_string()));
    }

    Ok(next.run(request).await)
}
