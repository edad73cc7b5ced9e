//! Common test utilities for integration tests
//!
//! Tests need a reachable PostgreSQL at `DATABASE_URL` and a `JWT_SECRET`
//! (a `.env` file works). Every test uses fresh, random emails so tests can
//! share one database and run in parallel.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use thali_api::app::{build_router, AppState};
use thali_api::config::Config;
use thali_shared::db::{migrations, pool};
use tower::ServiceExt;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Connects, migrates and builds the router with default settings
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestContext::new`], with a hook to adjust configuration
    pub async fn with_config<F>(adjust: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Config::from_env()?;
        adjust(&mut config);

        migrations::ensure_database_exists(&config.database.url).await?;
        let db = pool::create_pool(config.pool_config()).await?;
        migrations::run_migrations(&db).await?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(Self { db, app, config })
    }

    /// Sends a request and returns the status with the parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(post_request(uri, None, body)).await
    }

    pub async fn post_with_token(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(post_request(uri, Some(token), body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

fn post_request(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A random email that no other test uses
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
