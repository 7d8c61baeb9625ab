use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use huddle_backend::app::build_router;
use huddle_backend::config::Config;
use huddle_backend::db::connection::create_pool;
use huddle_backend::repositories::{PgApiKeyStore, PgEventStore, PgUpdateStore, PgUserStore};
use huddle_backend::services::AccountService;
use huddle_backend::state::AppState;
use huddle_backend::utils::email::SmtpMailer;
use huddle_backend::utils::media::LocalMediaStore;

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        bind_addr = %config.bind_addr,
        jwt_secret = %mask_secret(&config.jwt_secret),
        session_token_expiration_days = config.session_token_expiration_days,
        api_key_header = %config.api_key_header,
        frontend_url = %config.frontend_url,
        upload_dir = %config.upload_dir,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let api_keys = Arc::new(PgApiKeyStore::new(pool.clone()));
    let events = Arc::new(PgEventStore::new(pool.clone()));
    let updates = Arc::new(PgUpdateStore::new(pool));

    let mailer = Arc::new(SmtpMailer::from_env()?);
    let media = Arc::new(LocalMediaStore::new(&config.upload_dir));

    let accounts = AccountService::new(users, mailer, media.clone(), config.clone());

    let state = AppState {
        accounts,
        api_keys,
        events,
        updates,
        media,
        config: config.clone(),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
