//! Shared fixtures for auth integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fittrack_auth::{
    AccountStore, CacheInvalidator, CredentialVerifier, InMemoryStore, ProfileRecord,
    RedirectPolicyGate, SessionMaterializer, StoreError, StoreResult, UserRecord, hash_password,
};
use fittrack_cache::{CacheError, CacheResult, CacheStore, MemoryCache};

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "correct horse battery staple";
pub const USER_ID: &str = "u1";

pub struct Harness {
    pub cache: Arc<MemoryCache>,
    pub store: Arc<InMemoryStore>,
    pub verifier: CredentialVerifier,
    pub sessions: SessionMaterializer,
    pub invalidator: CacheInvalidator,
    pub gate: RedirectPolicyGate,
}

impl Harness {
    pub fn new() -> Self {
        let cache = Arc::new(MemoryCache::new());
        let store = seeded_store();

        let sessions = SessionMaterializer::new(cache.clone(), store.clone());
        Self {
            verifier: CredentialVerifier::new(cache.clone(), store.clone()),
            invalidator: CacheInvalidator::new(cache.clone(), store.clone()),
            gate: RedirectPolicyGate::new(sessions.profiles().clone()),
            sessions,
            cache,
            store,
        }
    }

    pub fn set_profile(&self, height: Option<&str>, weight: Option<&str>) {
        self.store.upsert_profile(ProfileRecord {
            user_id: USER_ID.to_string(),
            height: height.map(String::from),
            current_weight: weight.map(String::from),
        });
    }
}

/// Store holding the test user and no profile.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.upsert_user(UserRecord {
        id: USER_ID.to_string(),
        email: EMAIL.to_string(),
        name: Some("Ana".to_string()),
        image: Some("https://img.example.com/ana.png".to_string()),
        password_hash: Some(hash_password(PASSWORD).expect("hash password")),
    });
    store
}

/// Cache whose every operation fails, as during a Redis outage.
pub struct FailingCache;

fn outage() -> CacheError {
    CacheError::Pool("connection refused".to_string())
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(outage())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(outage())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(outage())
    }

    async fn incr(&self, _key: &str, _ttl: Duration) -> CacheResult<i64> {
        Err(outage())
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CacheResult<bool> {
        Err(outage())
    }

    async fn ttl(&self, _key: &str) -> CacheResult<Option<Duration>> {
        Err(outage())
    }

    async fn hset_fields(
        &self,
        _key: &str,
        _fields: &[(&str, String)],
        _ttl: Duration,
    ) -> CacheResult<()> {
        Err(outage())
    }

    async fn hget_all(&self, _key: &str) -> CacheResult<HashMap<String, String>> {
        Err(outage())
    }

    async fn list_append(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<u64> {
        Err(outage())
    }

    async fn list_range(&self, _key: &str, _start: isize, _stop: isize) -> CacheResult<Vec<String>> {
        Err(outage())
    }

    async fn list_trim(&self, _key: &str, _start: isize, _stop: isize) -> CacheResult<()> {
        Err(outage())
    }
}

/// Store whose every lookup fails.
pub struct FailingStore;

#[async_trait]
impl AccountStore for FailingStore {
    async fn find_user_by_email(&self, _email: &str) -> StoreResult<Option<UserRecord>> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn find_user_by_id(&self, _id: &str) -> StoreResult<Option<UserRecord>> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn find_profile_by_user_id(&self, _user_id: &str) -> StoreResult<Option<ProfileRecord>> {
        Err(StoreError::Database("connection refused".to_string()))
    }
}
