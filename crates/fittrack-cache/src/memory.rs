//! In-process cache backend.
//!
//! Mirrors the Redis data model (strings, hashes, lists) on top of a
//! DashMap. Expired entries are removed lazily on access and by
//! [`MemoryCache::cleanup_expired`].
//!
//! Expiry uses `tokio::time::Instant`, so tests running with a paused clock
//! can advance past TTLs deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use crate::error::{CacheError, CacheResult};
use crate::store::CacheStore;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Some(Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

fn wrong_type(key: &str, expected: &str, found: &Value) -> CacheError {
    CacheError::Command(format!(
        "WRONGTYPE key '{key}' holds a {} value, expected {expected}",
        found.type_name()
    ))
}

/// Resolve Redis-style inclusive `start..=stop` indices against a length.
///
/// Returns `None` when the range selects nothing.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Single-instance cache backed by a DashMap.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| !e.is_expired())
    }

    /// Keys stored without an expiry. Always empty when every write goes
    /// through [`CacheStore`].
    pub fn keys_without_expiry(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.expires_at.is_none())
            .map(|e| e.key().clone())
            .collect()
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Live entry for `key`, evicting it first if it has expired.
    fn live(&self, key: &str) -> Option<CachedEntry> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.clone())
    }

    /// Occupied map entry for `key` with expired values already cleared.
    fn entry(&self, key: &str) -> Entry<'_, String, CachedEntry> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(occupied) if occupied.get().is_expired() => {
                let (key, _) = occupied.remove_entry();
                self.entries.entry(key)
            }
            other => other,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.live(key) {
            Some(CachedEntry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s)),
            Some(other) => Err(wrong_type(key, "string", &other.value)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            CachedEntry::new(Value::Str(value.to_string()), ttl),
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        match self.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let current = match &entry.value {
                    Value::Str(s) => s.parse::<i64>().map_err(|_| {
                        CacheError::Command(format!("value at '{key}' is not an integer"))
                    })?,
                    other => return Err(wrong_type(key, "string", other)),
                };
                let next = current + 1;
                entry.value = Value::Str(next.to_string());
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CachedEntry::new(Value::Str("1".to_string()), ttl));
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        match self.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        Ok(self
            .live(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(Instant::now())))
    }

    async fn hset_fields(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> CacheResult<()> {
        match self.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let map = match &mut entry.value {
                    Value::Hash(map) => map,
                    other => return Err(wrong_type(key, "hash", other)),
                };
                for (field, value) in fields {
                    map.insert((*field).to_string(), value.clone());
                }
                entry.expires_at = Some(Instant::now() + ttl);
            }
            Entry::Vacant(vacant) => {
                let map = fields
                    .iter()
                    .map(|(f, v)| ((*f).to_string(), v.clone()))
                    .collect();
                vacant.insert(CachedEntry::new(Value::Hash(map), ttl));
            }
        }
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        match self.live(key) {
            Some(CachedEntry {
                value: Value::Hash(map),
                ..
            }) => Ok(map),
            Some(other) => Err(wrong_type(key, "hash", &other.value)),
            None => Ok(HashMap::new()),
        }
    }

    async fn list_append(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<u64> {
        match self.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let list = match &mut entry.value {
                    Value::List(list) => list,
                    other => return Err(wrong_type(key, "list", other)),
                };
                list.push_back(value.to_string());
                let len = list.len() as u64;
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(len)
            }
            Entry::Vacant(vacant) => {
                let list = VecDeque::from([value.to_string()]);
                vacant.insert(CachedEntry::new(Value::List(list), ttl));
                Ok(1)
            }
        }
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        match self.live(key) {
            Some(CachedEntry {
                value: Value::List(list),
                ..
            }) => Ok(match resolve_range(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }),
            Some(other) => Err(wrong_type(key, "list", &other.value)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_trim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()> {
        let Entry::Occupied(mut occupied) = self.entry(key) else {
            return Ok(());
        };
        let list = match &mut occupied.get_mut().value {
            Value::List(list) => list,
            other => return Err(wrong_type(key, "list", other)),
        };
        match resolve_range(list.len(), start, stop) {
            Some((from, to)) => {
                list.truncate(to + 1);
                list.drain(..from);
            }
            None => {
                // Redis removes a list that becomes empty.
                occupied.remove();
            }
        }
        Ok(())
    }
}
