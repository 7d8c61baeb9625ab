//! Account lifecycle driven end to end through the router.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{MultipartBuilder, TestApp, PASSWORD};

#[tokio::test]
async fn register_returns_sanitized_user_and_sends_code() {
    let app = TestApp::spawn().await;

    let user = app.register("ada@example.com").await;
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["verified"], false);
    assert!(user.get("password_hash").is_none());
    assert!(user.get("session_token").is_none());
    assert!(user.get("verification_code").is_none());

    let mail = app.mailer.last();
    assert_eq!(mail.to, "ada@example.com");
    let code = app.mailer.last_code();
    assert_eq!(code.len(), 6);
    let value: u32 = code.parse().expect("numeric code");
    assert!((100_000..=999_999).contains(&value));
}

#[tokio::test]
async fn register_lowercases_email() {
    let app = TestApp::spawn().await;
    let user = app.register("Ada@Example.COM").await;
    assert_eq!(user["email"], "ada@example.com");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;

    let form = MultipartBuilder::new()
        .text("first_name", "Other")
        .text("last_name", "Person")
        .text("email", "ADA@example.com")
        .text("password", PASSWORD)
        .file("profile_image", "a.png", "image/png", b"png");
    let (status, body) = app
        .multipart(Method::POST, "/api/v1/auth/register", form, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn register_validates_fields() {
    let app = TestApp::spawn().await;

    let form = MultipartBuilder::new()
        .text("first_name", "Ada")
        .text("last_name", "Lovelace")
        .text("email", "not-an-email")
        .text("password", "seven77")
        .file("profile_image", "a.pdf", "application/pdf", b"pdf");
    let (status, body) = app
        .multipart(Method::POST, "/api/v1/auth/register", form, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let errors = body["details"]["errors"].as_array().expect("errors");
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("email")));
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("password")));
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("profile_image")));
}

#[tokio::test]
async fn verify_rejects_wrong_code_then_accepts_right_one() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;
    let code = app.mailer.last_code();
    let wrong = if code == "100000" { "100001" } else { "100000" };

    let (status, body) = app
        .post_json(
            "/api/v1/auth/verify",
            json!({ "email": "ada@example.com", "verification_code": wrong }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid verification code.");

    let (status, _) = app
        .post_json(
            "/api/v1/auth/verify",
            json!({ "email": "ada@example.com", "verification_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second verify is rejected as already verified.
    let (status, body) = app
        .post_json(
            "/api/v1/auth/verify",
            json!({ "email": "ada@example.com", "verification_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is already verified.");
}

#[tokio::test]
async fn login_requires_verified_account_and_correct_password() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;

    let (status, _) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "missing@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User doesn't exist!");

    let (token, _) = app.register_verified("grace@example.com").await;
    assert!(!token.is_empty());

    let (status, _) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "grace@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_login_invalidates_first_session() {
    let app = TestApp::spawn().await;
    let (first, _) = app.register_verified("ada@example.com").await;

    let (status, body) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["token"].as_str().expect("token").to_string();

    let (status, _) = app.get("/api/v1/auth", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/v1/auth", Some(&first)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SESSION_INVALID");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register_verified("ada@example.com").await;

    let (status, _) = app
        .json(Method::POST, "/api/v1/auth/logout", json!({}), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/v1/auth", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "SESSION_INVALID");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/v1/auth", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Access denied, no token provided.");

    let (status, body) = app.get("/api/v1/auth", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn user_listing_paginates() {
    let app = TestApp::spawn().await;
    for i in 0..24 {
        app.register(&format!("user{}@example.com", i)).await;
    }
    let (token, _) = app.register_verified("viewer@example.com").await;

    let (status, body) = app
        .get("/api/v1/auth?page=2&limit=10", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("data").len(), 10);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["total_pages"], 3);
}

#[tokio::test]
async fn fetch_single_user() {
    let app = TestApp::spawn().await;
    let (token, me) = app.register_verified("ada@example.com").await;
    let id = me["id"].as_str().expect("id");

    let (status, body) = app.get(&format!("/api/v1/auth/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");

    let (status, _) = app.get("/api/v1/auth/nope", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_changes_fields_and_checks_email_conflicts() {
    let app = TestApp::spawn().await;
    app.register("taken@example.com").await;
    let (token, _) = app.register_verified("ada@example.com").await;

    let form = MultipartBuilder::new()
        .text("first_name", "Renamed")
        .text("email", "New@Example.com");
    let (status, body) = app
        .multipart(Method::PUT, "/api/v1/auth", form, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["user"]["first_name"], "Renamed");
    assert_eq!(body["user"]["email"], "new@example.com");

    let form = MultipartBuilder::new().text("email", "taken@example.com");
    let (status, body) = app
        .multipart(Method::PUT, "/api/v1/auth", form, Some(&token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn delete_account_removes_user_and_session() {
    let app = TestApp::spawn().await;
    let (token, me) = app.register_verified("ada@example.com").await;

    let (status, body) = app.delete("/api/v1/auth", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], me["id"]);

    // The profile image stored at registration was cleaned up.
    assert!(app.media.is_empty());

    let (status, _) = app.get("/api/v1/auth", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resend_verification_issues_a_new_code() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;
    let first_code = app.mailer.last_code();

    let (status, _) = app
        .post_json(
            "/api/v1/auth/resend-verification",
            json!({ "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_code = app.mailer.last_code();

    // The first code no longer verifies unless it happens to repeat.
    if new_code != first_code {
        let (status, _) = app
            .post_json(
                "/api/v1/auth/verify",
                json!({ "email": "ada@example.com", "verification_code": first_code }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = app
        .post_json(
            "/api/v1/auth/verify",
            json!({ "email": "ada@example.com", "verification_code": new_code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn resend_verification_rejects_verified_accounts() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@example.com").await;

    let (status, body) = app
        .post_json(
            "/api/v1/auth/resend-verification",
            json!({ "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already verified.");
}

#[tokio::test]
async fn registration_survives_mail_failure() {
    let app = TestApp::spawn().await;
    app.mailer.fail_next();

    let form = MultipartBuilder::new()
        .text("first_name", "Ada")
        .text("last_name", "Lovelace")
        .text("email", "ada@example.com")
        .text("password", PASSWORD)
        .file("profile_image", "a.png", "image/png", b"png");
    let (status, body) = app
        .multipart(Method::POST, "/api/v1/auth/register", form, None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "EMAIL_DELIVERY_ERROR");

    // The account was persisted anyway; a resend recovers it.
    let (status, _) = app
        .post_json(
            "/api/v1/auth/resend-verification",
            json!({ "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
