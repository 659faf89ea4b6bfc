//! Integration test: `rest` forwards envelopes over HTTP to a registered
//! service instance.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use hydra_cli::Context;
use hydra_core::keys;
use hydra_integration_tests::{configured, invoke, node_json, SharedConnector};
use hydra_registry::MemoryStore;
use serde_json::{json, Value};

/// Start a fake service and register it as the only `users` instance.
async fn registered_service() -> SharedConnector {
    let app = Router::new()
        .route(
            "/v1/users",
            post(|Json(body): Json<Value>| async move { Json(json!({"created": body})) }),
        )
        .route("/v1/health", get(|| async { Json(json!({"status": "ok"})) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = MemoryStore::new();
    store.hset(keys::NODES_HASH, "users01", node_json("users", "users01", port, Utc::now()));
    store.set_string(format!("{}:users:users01:presence", keys::PREFIX), "users01");
    SharedConnector(Arc::new(store))
}

#[tokio::test]
async fn test_rest_get() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = Context::new(configured(dir.path()), registered_service().await);

    let out = invoke(&mut ctx, &["rest", "users:/v1/health"], "").await;
    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_rest_post_with_payload_file() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("user.json");
    std::fs::write(&payload, r#"{"name": "ada"}"#).unwrap();
    let mut ctx = Context::new(configured(dir.path()), registered_service().await);

    let out = invoke(
        &mut ctx,
        &["rest", "users:[post]/v1/users", payload.to_str().unwrap()],
        "",
    )
    .await;
    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response, json!({"created": {"name": "ada"}}));
}

#[tokio::test]
async fn test_rest_to_explicit_instance() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = Context::new(configured(dir.path()), registered_service().await);

    let out = invoke(&mut ctx, &["rest", "users01@users:[get]/v1/health"], "").await;
    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["status"], "ok");

    let out = invoke(&mut ctx, &["rest", "gone99@users:/v1/health"], "").await;
    assert_eq!(out, "service gone99@users is not available\n");
}

#[tokio::test]
async fn test_rest_with_leading_method() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("user.json");
    std::fs::write(&payload, r#"{"name": "grace"}"#).unwrap();
    let mut ctx = Context::new(configured(dir.path()), registered_service().await);

    let out = invoke(
        &mut ctx,
        &["rest", "[POST]users:/v1/users", payload.to_str().unwrap()],
        "",
    )
    .await;
    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response, json!({"created": {"name": "grace"}}));

    let out = invoke(&mut ctx, &["rest", "[delete]users:/v1/users", payload.to_str().unwrap()], "").await;
    assert_eq!(out, "Can't use HTTP delete with a payload\n");
}

#[tokio::test]
async fn test_rest_to_node_with_string_port() {
    let app = Router::new().route("/v1/health", get(|| async { Json(json!({"status": "ok"})) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = MemoryStore::new();
    store.hset(
        keys::NODES_HASH,
        "users02",
        json!({"serviceName": "users", "serviceIP": "127.0.0.1", "servicePort": port.to_string()}).to_string(),
    );
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = Context::new(configured(dir.path()), SharedConnector(Arc::new(store)));

    let out = invoke(&mut ctx, &["rest", "users:/v1/health"], "").await;
    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["status"], "ok");
}
