//! Cron entry point: purges expired API keys and clears stale
//! password-reset fields.

use chrono::Utc;
use std::sync::Arc;

use huddle_backend::config::Config;
use huddle_backend::db::connection::create_pool;
use huddle_backend::repositories::{
    ApiKeyStore, PgApiKeyStore, PgUserStore, UserStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let api_keys: Arc<dyn ApiKeyStore> = Arc::new(PgApiKeyStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));

    let now = Utc::now();

    let deleted_keys = api_keys.delete_expired(now).await?;
    if deleted_keys > 0 {
        tracing::info!("Deleted {} expired API keys", deleted_keys);
    }

    let cleared_resets = users.clear_expired_reset_tokens(now).await?;
    if cleared_resets > 0 {
        tracing::info!("Cleared {} expired password reset tokens", cleared_resets);
    }

    Ok(())
}
