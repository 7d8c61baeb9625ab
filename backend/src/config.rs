use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Validity of issued session tokens, in days.
    pub session_token_expiration_days: u64,
    /// Name of the request header carrying the API key.
    pub api_key_header: String,
    /// Base URL embedded in password-reset links.
    pub frontend_url: String,
    /// Directory where uploaded images are stored.
    pub upload_dir: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/huddle".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let session_token_expiration_days = env::var("SESSION_TOKEN_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let api_key_header = env::var("API_KEY_HEADER").unwrap_or_else(|_| "x-api-key".to_string());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        Ok(Config {
            database_url,
            bind_addr,
            jwt_secret,
            session_token_expiration_days,
            api_key_header,
            frontend_url,
            upload_dir,
        })
    }
}
