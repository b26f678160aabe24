#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use service_core::config::Config as CoreConfig;
use spot_service::config::SpotConfig;
use spot_service::services::{InMemorySpotStore, MongoSpotStore};
use spot_service::startup::{build_router, AppState, Application};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Router over a fresh in-memory store.
pub fn in_memory_app() -> (Router, Arc<InMemorySpotStore>) {
    let store = Arc::new(InMemorySpotStore::new());
    let router = build_router(AppState::new(store.clone()), &[]);
    (router, store)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is not UTF-8")
    }
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    send_request(router, builder.body(body).unwrap()).await
}

pub async fn send_request(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

pub fn mongo_uri() -> String {
    std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn test_config(uri: &str, database: &str) -> SpotConfig {
    let uri = uri.to_string();
    let database = database.to_string();
    let mut config = SpotConfig::from_lookup(CoreConfig::default(), move |key| match key {
        "MONGO_URI" => Some(uri.clone()),
        "MONGO_DATABASE" => Some(database.clone()),
        _ => None,
    })
    .expect("Failed to build test configuration");
    config.common.port = 0; // Random port for testing
    config
}

/// Full application against a real MongoDB, one database per test.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoSpotStore,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("spot_test_{}", Uuid::new_v4());
        let config = test_config(&mongo_uri(), &db_name);

        let db = MongoSpotStore::connect(&config.mongodb)
            .await
            .expect("Failed to create MongoDB client");

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    pub async fn cleanup(&self) {
        let _ = self.db.database().drop(None).await;
    }
}
