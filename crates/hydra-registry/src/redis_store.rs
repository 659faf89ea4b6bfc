//! Redis backend for the registry client.

use async_trait::async_trait;
use hydra_core::StoreSettings;
use redis::aio::MultiplexedConnection;
use redis::Client;

use crate::error::{RegistryError, Result};
use crate::store::RegistryStore;

/// Registry store backed by one multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the configured host and select the configured database.
    ///
    /// The connection is verified with a `PING`; a refused connection or an
    /// invalid database index fails here. There is no retry.
    pub async fn connect(settings: &StoreSettings) -> Result<Self> {
        tracing::debug!(host = %settings.host, port = settings.port, db = settings.db, "connecting to registry store");
        let client = Client::open(settings.url())
            .map_err(|e| RegistryError::Connection(e.to_string()))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RegistryError::Connection(e.to_string()))?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| RegistryError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

#[async_trait]
impl RegistryStore for RedisStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        tracing::debug!(pattern, "KEYS");
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.conn())
            .await?;
        Ok(keys)
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        tracing::debug!(key, "HGETALL");
        let fields: Vec<(String, String)> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut self.conn())
            .await?;
        Ok(fields)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        tracing::debug!(key, field, "HGET");
        let value: Option<String> = redis::cmd("HGET")
            .arg(key)
            .arg(field)
            .query_async(&mut self.conn())
            .await?;
        Ok(value)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        tracing::debug!(key, field, "HDEL");
        let removed: u64 = redis::cmd("HDEL")
            .arg(key)
            .arg(field)
            .query_async(&mut self.conn())
            .await?;
        Ok(removed)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        tracing::debug!(key, "SMEMBERS");
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(key)
            .query_async(&mut self.conn())
            .await?;
        Ok(members)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        tracing::debug!(key, start, stop, "LRANGE");
        let items: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut self.conn())
            .await?;
        Ok(items)
    }

    async fn multi_lrange(
        &self,
        keys: &[String],
        start: isize,
        stop: isize,
    ) -> Result<Vec<Vec<String>>> {
        tracing::debug!(count = keys.len(), start, stop, "MULTI LRANGE");
        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.cmd("LRANGE").arg(key).arg(start).arg(stop);
        }
        let lists: Vec<Vec<String>> = pipe.query_async(&mut self.conn()).await?;
        Ok(lists)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<u64> {
        tracing::debug!(channel, "PUBLISH");
        let receivers: u64 = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async(&mut self.conn())
            .await?;
        Ok(receivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Port 1 on loopback is never a Redis server.
        let settings = StoreSettings {
            host: "127.0.0.1".into(),
            port: 1,
            db: 0,
        };
        let result = RedisStore::connect(&settings).await;
        assert!(matches!(result, Err(RegistryError::Connection(_))));
    }
}
