//! Fixtures shared by the integration tests: a seeded in-memory registry and
//! helpers to run full CLI invocations against it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use hydra_cli::{Connector, Context};
use hydra_core::config::CONFIG_FILE_NAME;
use hydra_core::keys;
use hydra_core::{ConfigStore, StoreSettings};
use hydra_registry::{MemoryStore, RegistryError};

/// Hands every command the same shared in-memory store.
#[derive(Clone, Default)]
pub struct SharedConnector(pub Arc<MemoryStore>);

#[async_trait]
impl Connector for SharedConnector {
    type Store = Arc<MemoryStore>;

    async fn connect(&self, _settings: &StoreSettings) -> Result<Arc<MemoryStore>, RegistryError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Node JSON as a running service publishes it.
pub fn node_json(name: &str, instance: &str, port: u16, updated_on: DateTime<Utc>) -> String {
    serde_json::json!({
        "serviceName": name,
        "serviceDescription": format!("{name} service"),
        "version": "1.0.0",
        "instanceID": instance,
        "updatedOn": updated_on.to_rfc3339_opts(SecondsFormat::Millis, true),
        "processID": 4242,
        "ip": "127.0.0.1",
        "serviceIP": "127.0.0.1",
        "servicePort": port,
    })
    .to_string()
}

/// A registry with three services (`alpha`, `beta`, `gamma`), one instance
/// each, routes for all of them and a health log for `beta`.
pub fn seeded_store(now: DateTime<Utc>) -> MemoryStore {
    let store = MemoryStore::new();
    for (i, name) in ["alpha", "beta", "gamma"].iter().enumerate() {
        let instance = format!("{name}01");
        let updated = now - Duration::seconds(5 * (i as i64 + 1));
        store.hset(keys::NODES_HASH, &instance, node_json(name, &instance, 5000 + i as u16, updated));
        store.sadd(
            keys::routes_key(name),
            [format!("[get]/v1/{name}"), format!("[post]/v1/{name}")],
        );
        store.set_string(format!("{}:{name}:{instance}:presence", keys::PREFIX), instance.clone());
    }
    store.lpush(
        format!("{}:beta:beta01:health:log", keys::PREFIX),
        [r#"{"event":"start"}"#, "plain text entry", r#"{"event":"ok"}"#],
    );
    store
}

/// Write a configured config file into `dir` and load it.
pub fn configured(dir: &Path) -> ConfigStore {
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"{"redisUrl": "127.0.0.1", "redisPort": "6379", "redisDb": "15"}"#,
    )
    .expect("write config");
    ConfigStore::load(path)
}

/// Run one invocation with the given stdin, returning what it printed.
pub async fn invoke(ctx: &mut Context<SharedConnector>, words: &[&str], stdin: &str) -> String {
    let args: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    let mut input = stdin.as_bytes();
    let mut out = Vec::new();
    ctx.run(&args, &mut input, &mut out).await;
    String::from_utf8(out).expect("utf-8 output")
}
