//! Session middleware resolving bearer tokens to accounts.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Id of the authenticated account, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Extracts the token from an `Authorization: Bearer <token>` header.
/// Scheme matching is case-insensitive.
pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next()?;
    let token = parts.next()?.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Requires a live session. The token must verify and still occupy the
/// account's single session slot; on success the `User` record and a
/// `CurrentUser` id wrapper are available to downstream handlers.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("Access denied, no token provided.".to_string())
        })?;

    let token = parse_bearer_token(header).ok_or_else(|| {
        AppError::Unauthorized("Access denied, no token provided.".to_string())
    })?;

    let user = state.accounts.authenticate(token).await?;

    request.extensions_mut().insert(CurrentUser(user.id.clone()));
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
