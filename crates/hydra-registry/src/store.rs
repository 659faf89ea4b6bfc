//! The raw key-value store surface the registry client is built on.

use async_trait::async_trait;

use crate::error::Result;

/// Store operations used by the registry client.
///
/// Implemented by [`crate::RedisStore`] for real use and by
/// the in-memory `MemoryStore` in tests.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Enumerate keys matching a glob-style pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// All field/value pairs of a hash.
    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// One field of a hash.
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Remove one field of a hash, returning how many fields were removed.
    async fn hdel(&self, key: &str, field: &str) -> Result<u64>;

    /// Members of a set.
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// Range of a list, inclusive on both ends.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// One `LRANGE` per key inside a single atomic batch, results in key order.
    async fn multi_lrange(
        &self,
        keys: &[String],
        start: isize,
        stop: isize,
    ) -> Result<Vec<Vec<String>>>;

    /// Publish a payload on a pub/sub channel, returning the receiver count.
    async fn publish(&self, channel: &str, payload: &str) -> Result<u64>;
}

#[async_trait]
impl<T: RegistryStore + ?Sized> RegistryStore for std::sync::Arc<T> {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        (**self).keys(pattern).await
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        (**self).hgetall(key).await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        (**self).hget(key, field).await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        (**self).hdel(key, field).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        (**self).smembers(key).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        (**self).lrange(key, start, stop).await
    }

    async fn multi_lrange(
        &self,
        keys: &[String],
        start: isize,
        stop: isize,
    ) -> Result<Vec<Vec<String>>> {
        (**self).multi_lrange(keys, start, stop).await
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<u64> {
        (**self).publish(channel, payload).await
    }
}
