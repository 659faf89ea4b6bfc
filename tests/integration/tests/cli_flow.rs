//! Integration test: full CLI invocations against a seeded registry.

use std::sync::Arc;

use chrono::Utc;
use hydra_cli::Context;
use hydra_core::config::CONFIG_FILE_NAME;
use hydra_core::keys;
use hydra_core::ConfigStore;
use hydra_integration_tests::{configured, invoke, seeded_store, SharedConnector};
use serde_json::{json, Value};

fn context(dir: &std::path::Path) -> (Context<SharedConnector>, SharedConnector) {
    let connector = SharedConnector(Arc::new(seeded_store(Utc::now())));
    (Context::new(configured(dir), connector.clone()), connector)
}

// =========================================================================
// config
// =========================================================================

#[tokio::test]
async fn test_config_then_list_shows_answers_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, r#"{"serviceName": "hydra-cli", "redisUrl": "old"}"#).unwrap();

    let mut ctx = Context::new(ConfigStore::load(&path), SharedConnector::default());
    invoke(&mut ctx, &["config"], "redis.example\n06379\n3\n").await;

    // A fresh process reads the saved file.
    let mut ctx = Context::new(ConfigStore::load(&path), SharedConnector::default());
    let listed: Value = serde_json::from_str(&invoke(&mut ctx, &["config", "list"], "").await).unwrap();
    assert_eq!(
        listed,
        json!({
            "serviceName": "hydra-cli",
            "redisUrl": "redis.example",
            "redisPort": "06379",
            "redisDb": "3",
        })
    );
}

#[tokio::test]
async fn test_corrupt_config_fails_with_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "{{{{").unwrap();

    let mut ctx = Context::new(ConfigStore::load(&path), SharedConnector::default());
    let commands: [&[&str]; 4] = [
        &["nodes"],
        &["routes"],
        &["healthlog", "beta"],
        &["nodes", "remove", "x"],
    ];
    for words in commands {
        let out = invoke(&mut ctx, words, "").await;
        assert!(out.starts_with("unable to connect to registry store"), "{words:?}: {out}");
    }
}

// =========================================================================
// message
// =========================================================================

#[tokio::test]
async fn test_message_create_then_send() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, connector) = context(dir.path());

    let created = invoke(&mut ctx, &["message", "create"], "").await;
    let mut message: Value = serde_json::from_str(&created).unwrap();
    message["to"] = json!("beta:/");
    message["body"] = json!({"ping": true});
    let file = dir.path().join("msg.json");
    std::fs::write(&file, message.to_string()).unwrap();

    let out = invoke(&mut ctx, &["message", "send", file.to_str().unwrap()], "").await;
    assert_eq!(out, "Message sent to hydra:service:mc:beta:beta01\n");

    let published = connector.0.published();
    assert_eq!(published.len(), 1);
    let sent: Value = serde_json::from_str(&published[0].1).unwrap();
    assert_eq!(sent, message);
}

#[tokio::test]
async fn test_unmodified_template_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, connector) = context(dir.path());

    let file = dir.path().join("template.json");
    std::fs::write(&file, invoke(&mut ctx, &["message", "create"], "").await).unwrap();

    let out = invoke(&mut ctx, &["message", "send", file.to_str().unwrap()], "").await;
    assert!(out.starts_with("Message sent to "), "{out}");
    assert_eq!(connector.0.published().len(), 1);
}

#[tokio::test]
async fn test_message_send_arity() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, connector) = context(dir.path());
    let out = invoke(&mut ctx, &["message", "send"], "").await;
    assert_eq!(out, "Usage: hydra-cli message send <messageFile>\n");
    assert!(connector.0.published().is_empty());
}

// =========================================================================
// nodes
// =========================================================================

#[tokio::test]
async fn test_nodes_list_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());

    let all: Vec<Value> = serde_json::from_str(&invoke(&mut ctx, &["nodes"], "").await).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|n| n["elapsed"].as_i64().unwrap() >= 5));

    let beta: Vec<Value> =
        serde_json::from_str(&invoke(&mut ctx, &["nodes", "list", "bet"], "").await).unwrap();
    assert_eq!(beta.len(), 1);
    assert_eq!(beta[0]["instanceID"], "beta01");

    let none: Vec<Value> =
        serde_json::from_str(&invoke(&mut ctx, &["nodes", "list", "zeta"], "").await).unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_nodes_list_shows_loosely_typed_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, connector) = context(dir.path());
    connector.0.hset(
        keys::NODES_HASH,
        "beta02",
        r#"{"serviceName":"beta","serviceIP":null,"servicePort":"5001","updatedOn":1704067200000}"#,
    );
    connector.0.hset(keys::NODES_HASH, "junk", "not json");

    let beta: Vec<Value> =
        serde_json::from_str(&invoke(&mut ctx, &["nodes", "list", "beta"], "").await).unwrap();
    assert_eq!(beta.len(), 2);
    assert_eq!(beta[1]["servicePort"], "5001");
    assert!(beta[1]["serviceIP"].is_null());
    assert!(beta[1].get("elapsed").is_none());
}

#[tokio::test]
async fn test_nodes_remove() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());

    assert_eq!(
        invoke(&mut ctx, &["nodes", "remove", "gamma01"], "").await,
        "Removed node gamma01\n"
    );
    let all: Vec<Value> = serde_json::from_str(&invoke(&mut ctx, &["nodes"], "").await).unwrap();
    assert_eq!(all.len(), 2);
}

// =========================================================================
// routes / healthlog
// =========================================================================

#[tokio::test]
async fn test_routes_filter_selects_one_service() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());

    let routes: Value = serde_json::from_str(&invoke(&mut ctx, &["routes", "beta"], "").await).unwrap();
    let object = routes.as_object().unwrap();
    assert_eq!(object.len(), 1);
    let mut beta: Vec<&str> = object["beta"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap())
        .collect();
    beta.sort();
    assert_eq!(beta, ["[get]/v1/beta", "[post]/v1/beta"]);
}

#[tokio::test]
async fn test_healthlog() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());

    let log: Value = serde_json::from_str(&invoke(&mut ctx, &["healthlog", "beta"], "").await).unwrap();
    assert_eq!(
        log,
        json!([{"event": "ok"}, "plain text entry", {"event": "start"}])
    );

    assert_eq!(invoke(&mut ctx, &["healthlog", "alpha"], "").await, "[]\n");
}

// =========================================================================
// rest / dispatch
// =========================================================================

#[tokio::test]
async fn test_rest_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());

    let out = invoke(&mut ctx, &["rest", "beta:[delete]/v1/beta/1", "body.json"], "").await;
    assert_eq!(out, "Can't use HTTP delete with a payload\n");

    let out = invoke(&mut ctx, &["rest", "beta"], "").await;
    assert!(out.starts_with("route field has invalid number of routable segments"), "{out}");
}

#[tokio::test]
async fn test_rest_to_unregistered_service() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());
    let out = invoke(&mut ctx, &["rest", "zeta:/v1/zeta"], "").await;
    assert_eq!(out, "service zeta is not available\n");
}

#[tokio::test]
async fn test_unknown_verbs() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _) = context(dir.path());
    assert_eq!(invoke(&mut ctx, &["deploy"], "").await, "Unknown command: deploy\n");
    assert_eq!(
        invoke(&mut ctx, &["nodes", "drain"], "").await,
        "Unknown nodes command: drain\n"
    );
}
