//! The cache store trait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CacheResult;

/// Key/value store with per-key TTL, atomic counters, hashes and lists.
///
/// Semantics follow Redis: hashes and lists that do not exist read as empty,
/// list indices may be negative (counted from the tail), and `incr` on a
/// missing key starts from zero.
///
/// All writes carry a TTL. Implementations must apply it atomically with
/// the write where the underlying store allows it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a string value.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a string value, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Atomically increment a counter and (re)set its TTL.
    ///
    /// Returns the value after the increment.
    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<i64>;

    /// Refresh the TTL of an existing key. Returns `false` if the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Remaining TTL of a key, `None` if the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Write hash fields and (re)set the hash TTL in one step.
    async fn hset_fields(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Read all fields of a hash. A missing hash reads as empty.
    async fn hget_all(&self, key: &str) -> CacheResult<HashMap<String, String>>;

    /// Append a value to the tail of a list and refresh the list TTL.
    ///
    /// Returns the list length after the append.
    async fn list_append(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<u64>;

    /// Read the inclusive range `start..=stop` of a list.
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>>;

    /// Keep only the inclusive range `start..=stop` of a list.
    async fn list_trim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()>;
}

/// JSON helpers available on every [`CacheStore`].
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Get and decode a JSON value.
    async fn get_json<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and set a JSON value.
    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}
