//! Typed registry queries over a [`RegistryStore`].

use futures::future::join_all;
use hydra_core::keys;
use hydra_core::ServiceNode;

use crate::error::Result;
use crate::store::RegistryStore;

/// Registry client façade.
///
/// Error policy differs per query: wildcard enumeration
/// ([`Registry::find_keys`]) treats a failure as "no matches", while lookups
/// of one named key ([`Registry::get_routes`], [`Registry::delete_node`], ...)
/// propagate it.
pub struct Registry<S> {
    store: S,
}

impl<S: RegistryStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keys matching `pattern`; a store failure yields an empty list.
    pub async fn find_keys(&self, pattern: &str) -> Vec<String> {
        match self.store.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "key lookup failed, treating as no matches");
                Vec::new()
            }
        }
    }

    /// Route patterns registered by one service.
    pub async fn get_routes(&self, service_name: &str) -> Result<Vec<String>> {
        self.store.smembers(&keys::routes_key(service_name)).await
    }

    /// Route sets of several services, fetched concurrently.
    ///
    /// Results keep the order of `service_names`; the first failure is
    /// returned.
    pub async fn get_routes_for(
        &self,
        service_names: &[String],
    ) -> Result<Vec<(String, Vec<String>)>> {
        let lookups = service_names.iter().map(|name| async move {
            self.get_routes(name).await.map(|routes| (name.clone(), routes))
        });
        join_all(lookups).await.into_iter().collect()
    }

    /// Every node in the nodes hash, keyed by instance id.
    ///
    /// Entries that are not a JSON object are skipped. Nodes are otherwise
    /// returned as published, whatever the types of their fields.
    pub async fn get_all_nodes(&self) -> Result<Vec<(String, ServiceNode)>> {
        let fields = self.store.hgetall(keys::NODES_HASH).await?;
        Ok(fields
            .into_iter()
            .filter_map(|(id, raw)| {
                let node = serde_json::from_str(&raw).ok().and_then(ServiceNode::from_value);
                if node.is_none() {
                    tracing::warn!(instance = %id, "skipping node entry that is not a JSON object");
                }
                node.map(|node| (id, node))
            })
            .collect())
    }

    /// One node by instance id.
    pub async fn get_node(&self, instance_id: &str) -> Result<Option<ServiceNode>> {
        let raw = self.store.hget(keys::NODES_HASH, instance_id).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Remove a node by exact instance id. Returns whether it existed.
    pub async fn delete_node(&self, instance_id: &str) -> Result<bool> {
        let removed = self.store.hdel(keys::NODES_HASH, instance_id).await?;
        Ok(removed > 0)
    }

    /// Read `start..=end` of several lists in one atomic batch.
    pub async fn batch_list_range(
        &self,
        keys: &[String],
        start: isize,
        end: isize,
    ) -> Result<Vec<Vec<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.store.multi_lrange(keys, start, end).await
    }

    /// Instance ids of a service holding a live presence key.
    pub async fn find_service_instances(&self, service_name: &str) -> Vec<String> {
        self.find_keys(&keys::presence_pattern(service_name))
            .await
            .iter()
            .filter_map(|key| keys::instance_from_presence_key(service_name, key))
            .map(str::to_string)
            .collect()
    }

    /// Publish a payload on a registry channel.
    pub async fn publish(&self, channel: &str, payload: &str) -> Result<u64> {
        self.store.publish(channel, payload).await
    }
}
