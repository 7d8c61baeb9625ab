pub mod api_key;
pub mod auth;

pub use api_key::require_api_key;
pub use auth::{require_session, CurrentUser};
