#![allow(dead_code)]

//! Shared harness: an in-memory application driven through the router
//! with `tower::ServiceExt::oneshot`, plus a mailer that records every
//! send so tests can fish out codes and reset links.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use huddle_backend::app::build_router;
use huddle_backend::config::Config;
use huddle_backend::models::api_key::ApiKey;
use huddle_backend::repositories::{
    ApiKeyStore, MemoryApiKeyStore, MemoryEventStore, MemoryUpdateStore, MemoryUserStore,
};
use huddle_backend::services::AccountService;
use huddle_backend::state::AppState;
use huddle_backend::utils::email::{MailError, Mailer};
use huddle_backend::utils::media::MemoryMediaStore;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records outbound mail instead of sending it. `fail_next` makes the
/// following send error, for exercising the delivery-failure paths.
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mailer lock").clone()
    }

    pub fn last(&self) -> SentMail {
        self.sent()
            .last()
            .cloned()
            .expect("at least one mail sent")
    }

    /// Digits of the most recent mail body, i.e. the verification code.
    pub fn last_code(&self) -> String {
        self.last()
            .body
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }

    /// Token query parameter of the most recent reset link.
    pub fn last_reset_token(&self) -> String {
        let body = self.last().body;
        let (_, rest) = body.split_once("token=").expect("reset link in mail");
        rest.split_whitespace()
            .next()
            .expect("token value")
            .to_string()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(MailError::from(anyhow::anyhow!("smtp unavailable")));
        }
        self.sent.lock().expect("mailer lock").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub api_keys: Arc<MemoryApiKeyStore>,
    pub events: Arc<MemoryEventStore>,
    pub updates: Arc<MemoryUpdateStore>,
    pub media: Arc<MemoryMediaStore>,
    pub mailer: Arc<RecordingMailer>,
    pub api_key: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = Config {
            database_url: String::new(),
            bind_addr: String::new(),
            jwt_secret: "test-secret".to_string(),
            session_token_expiration_days: 30,
            api_key_header: "x-api-key".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            upload_dir: "./uploads".to_string(),
        };

        let users = Arc::new(MemoryUserStore::new());
        let api_keys = Arc::new(MemoryApiKeyStore::new());
        let events = Arc::new(MemoryEventStore::new());
        let updates = Arc::new(MemoryUpdateStore::new());
        let media = Arc::new(MemoryMediaStore::new());
        let mailer = Arc::new(RecordingMailer::new());

        let key = ApiKey::mint().expect("mint api key");
        api_keys.insert(&key).await.expect("insert api key");

        let accounts = AccountService::new(
            users.clone(),
            mailer.clone(),
            media.clone(),
            config.clone(),
        );

        let state = AppState {
            accounts,
            api_keys: api_keys.clone(),
            events: events.clone(),
            updates: updates.clone(),
            media: media.clone(),
            config,
        };

        Self {
            router: build_router(state),
            users,
            api_keys,
            events,
            updates,
            media,
            mailer,
            api_key: key.key,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request handled");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    fn builder(&self, method: Method, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("x-api-key", &self.api_key);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = self
            .builder(Method::GET, path, token)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    pub async fn json(
        &self,
        method: Method,
        path: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let request = self
            .builder(method, path, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, path, body, None).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        path: &str,
        form: MultipartBuilder,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        let request = self
            .builder(method, path, token)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("build request");
        self.send(request).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = self
            .builder(Method::DELETE, path, token)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    /// Registers an account through the API; panics on failure.
    pub async fn register(&self, email: &str) -> Value {
        let form = MultipartBuilder::new()
            .text("first_name", "Test")
            .text("last_name", "User")
            .text("email", email)
            .text("password", PASSWORD)
            .file("profile_image", "avatar.png", "image/png", b"png-bytes");
        let (status, body) = self
            .multipart(Method::POST, "/api/v1/auth/register", form, None)
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["user"].clone()
    }

    /// Registers, verifies with the mailed code, and logs in.
    pub async fn register_verified(&self, email: &str) -> (String, Value) {
        self.register(email).await;
        let code = self.mailer.last_code();

        let (status, body) = self
            .post_json(
                "/api/v1/auth/verify",
                serde_json::json!({ "email": email, "verification_code": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {}", body);

        let (status, body) = self
            .post_json(
                "/api/v1/auth/login",
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        let token = body["token"].as_str().expect("token").to_string();
        (token, body["user"].clone())
    }
}

/// Builds a `multipart/form-data` body by hand.
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: "------------------------huddletest".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
