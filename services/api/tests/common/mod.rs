//! services/api/tests/common/mod.rs
//!
//! Shared setup for the integration tests: an in-memory SQLite database, a
//! scriptable generative-text gateway, and a `TestServer` over the full
//! router.

// Not every test binary uses every helper here.
#![allow(dead_code)]

use api_lib::adapters::db::DbAdapter;
use api_lib::coach::Coach;
use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use async_trait::async_trait;
use axum_test::TestServer;
use goggins_core::ports::{PortError, PortResult, TextGenerationService};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// A gateway that always fails, forcing every coach operation onto its
/// fallback path.
pub struct OfflineGateway;

#[async_trait]
impl TextGenerationService for OfflineGateway {
    async fn generate_text(&self, _: &str, _: &str) -> PortResult<String> {
        Err(PortError::Unexpected("offline".to_string()))
    }

    async fn generate_json(&self, _: &str, _: &str) -> PortResult<Value> {
        Err(PortError::Unexpected("offline".to_string()))
    }
}

/// A gateway that replies with fixed content, for exercising the generated
/// path.
pub struct CannedGateway {
    pub text: String,
    pub json: Value,
}

#[async_trait]
impl TextGenerationService for CannedGateway {
    async fn generate_text(&self, _: &str, _: &str) -> PortResult<String> {
        Ok(self.text.clone())
    }

    async fn generate_json(&self, _: &str, _: &str) -> PortResult<Value> {
        Ok(self.json.clone())
    }
}

fn test_config(default_key: Option<&str>) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        log_level: tracing::Level::INFO,
        gemini_api_key: default_key.map(str::to_string),
        gemini_api_base: "http://localhost/unused".to_string(),
        text_model: "test-model".to_string(),
        ai_timeout_secs: 1,
    }
}

/// Builds a server over a fresh in-memory database and the given gateway.
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn test_server_with(
    gateway: Arc<dyn TextGenerationService>,
    default_key: Option<&str>,
) -> TestServer {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON;").execute(conn).await?;
                Ok(())
            })
        })
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    let db = Arc::new(DbAdapter::new(pool));
    db.run_migrations().await.expect("run migrations");

    let state = Arc::new(AppState {
        db,
        coach: Coach::new(gateway),
        config: Arc::new(test_config(default_key)),
    });
    TestServer::new(web::app(state)).expect("build test server")
}

/// Default setup: offline gateway, process-level key present.
pub async fn test_server() -> TestServer {
    test_server_with(Arc::new(OfflineGateway), Some("test-key")).await
}

/// Registers a user and returns `(token, user_id)`.
pub async fn register(server: &TestServer, username: &str) -> (String, String) {
    let response = server
        .post("/auth/register")
        .json(&serde_json::json!({"username": username, "password": "hard-pass"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"]["id"].as_str().expect("user id").to_string(),
    )
}
