//! services/api/tests/auth_flow.rs
//!
//! Registration, login, token resolution, and the signup grubstake.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_then_login_round_trip() {
    let server = common::test_server().await;

    let (token, user_id) = common::register(&server, "david").await;
    assert_eq!(token, format!("mock-token-{user_id}"));

    let response = server
        .post("/auth/login")
        .json(&json!({"username": "david", "password": "hard-pass"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token"].as_str().unwrap(), token);
    assert_eq!(body["user"]["username"], "david");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let server = common::test_server().await;
    common::register(&server, "david").await;

    let response = server
        .post("/auth/register")
        .json(&json!({"username": "david", "password": "other"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Username already exists");
}

#[tokio::test]
async fn wrong_password_reads_as_user_not_found() {
    let server = common::test_server().await;
    common::register(&server, "david").await;

    let response = server
        .post("/auth/login")
        .json(&json!({"username": "david", "password": "soft-pass"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn unknown_user_cannot_log_in() {
    let server = common::test_server().await;

    let response = server
        .post("/auth/login")
        .json(&json!({"username": "nobody", "password": "whatever"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn passwordless_account_accepts_any_login() {
    let server = common::test_server().await;

    let response = server
        .post("/auth/register")
        .json(&json!({"username": "ghost"}))
        .await;
    response.assert_status_ok();

    let response = server
        .post("/auth/login")
        .json(&json!({"username": "ghost", "password": "anything-at-all"}))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn login_with_api_key_persists_it() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .post("/auth/login")
        .json(&json!({
            "username": "david",
            "password": "hard-pass",
            "api_key": "user-key-123"
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/auth/me").authorization_bearer(&token).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["api_key"], "user-key-123");
}

#[tokio::test]
async fn update_me_changes_the_stored_key() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server
        .put("/auth/me")
        .authorization_bearer(&token)
        .json(&json!({"api_key": "fresh-key"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["api_key"], "fresh-key");
}

#[tokio::test]
async fn default_token_resolves_to_the_first_user() {
    let server = common::test_server().await;
    common::register(&server, "first").await;
    common::register(&server, "second").await;

    let response = server
        .get("/auth/me")
        .authorization_bearer("mock-token-default")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "first");
}

#[tokio::test]
async fn default_token_with_no_users_is_rejected() {
    let server = common::test_server().await;

    let response = server
        .get("/auth/me")
        .authorization_bearer("mock-token-default")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "No default user found. Register first.");
}

#[tokio::test]
async fn missing_and_invalid_tokens_are_distinct() {
    let server = common::test_server().await;
    common::register(&server, "david").await;

    let response = server.get("/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Missing Authentication Token");

    let response = server
        .get("/auth/me")
        .authorization_bearer("not-a-mock-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Invalid Authentication Token");
}

#[tokio::test]
async fn bare_tokens_without_mock_prefix_resolve() {
    let server = common::test_server().await;
    let (_, user_id) = common::register(&server, "david").await;

    let response = server
        .get("/auth/me")
        .authorization_bearer(&user_id)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "david");

    let response = server.get("/auth/me").authorization_bearer("default").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "david");
}

#[tokio::test]
async fn registration_funds_the_character() {
    let server = common::test_server().await;
    let (token, _) = common::register(&server, "david").await;

    let response = server.get("/character").authorization_bearer(&token).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["spent"].as_f64().unwrap(), 0.0);
    assert_eq!(body["bonuses"].as_f64().unwrap(), 5.0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = common::test_server().await;
    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/tasks"].is_object());
    assert!(body["paths"]["/diary-entries/{date}"].is_object());
    assert!(body["paths"]["/ai/story"].is_object());
}

#[tokio::test]
async fn root_greeting_is_public() {
    let server = common::test_server().await;
    let response = server.get("/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Welcome to the Goggins Habit Tracker API. Stay Hard!"
    );
}
