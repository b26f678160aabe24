mod common;

use common::{mongo_uri, test_config, TestApp};
use reqwest::{Client, StatusCode};
use serde_json::json;
use spot_service::services::{InMemorySpotStore, SpotStore};
use spot_service::startup::Application;
use std::sync::Arc;

#[tokio::test]
async fn startup_fails_when_mongodb_is_unreachable() {
    let config = test_config(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
        "spot_unreachable",
    );

    let result = Application::build(config).await;
    assert!(result.is_err(), "ping against a closed port must fail startup");
}

#[tokio::test]
async fn startup_fails_on_invalid_connection_string() {
    let config = test_config("not-a-mongodb-uri", "spot_invalid");
    assert!(Application::build(config).await.is_err());
}

#[tokio::test]
async fn interrupt_closes_the_store() {
    let store = Arc::new(InMemorySpotStore::new());
    let config = test_config("mongodb://unused", "unused");
    let app = Application::build_with_store(config, store.clone())
        .await
        .expect("Failed to build application");

    let port = app.port();
    assert_ne!(port, 0);

    app.run_until_interrupted(async {})
        .await
        .expect("shutdown should be clean");

    assert!(store.is_closed());
    assert!(store.ping().await.is_err());
}

#[tokio::test]
#[ignore = "Requires MongoDB at MONGO_URI (default mongodb://localhost:27017)"]
async fn spot_lifecycle_against_mongodb() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let created = client
        .post(format!("{}/spot", app.address))
        .json(&json!({ "name": "Eiffel Tower", "country": "France" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status(), StatusCode::OK);
    let body: serde_json::Value = created.json().await.unwrap();
    let id = body["insertedId"].as_str().unwrap().to_string();

    let fetched: serde_json::Value = client
        .get(format!("{}/spot/{}", app.address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        fetched,
        json!({ "_id": id, "name": "Eiffel Tower", "country": "France" })
    );

    let listed: serde_json::Value = client
        .get(format!("{}/spot", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let deleted = client
        .delete(format!("{}/spot/delete/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let deleted: serde_json::Value = deleted.json().await.unwrap();
    assert_eq!(deleted["result"]["deletedCount"], 1);

    let again = client
        .delete(format!("{}/spot/delete/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let gone = client
        .get(format!("{}/spot/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at MONGO_URI (default mongodb://localhost:27017)"]
async fn mongodb_ping_succeeds_with_stable_api() {
    let config = test_config(&mongo_uri(), "spot_ping");
    let store = spot_service::services::MongoSpotStore::connect(&config.mongodb)
        .await
        .expect("Failed to create MongoDB client");
    store.ping().await.expect("ping should succeed");
    store.close().await;
}
