use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{ApiKeyStore, EventStore, UpdateStore};
use crate::services::AccountService;
use crate::utils::media::MediaStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub events: Arc<dyn EventStore>,
    pub updates: Arc<dyn UpdateStore>,
    pub media: Arc<dyn MediaStore>,
    pub config: Config,
}
