//! In-memory account store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{AccountStore, ProfileRecord, StoreResult, UserRecord};

/// Lookup counters, used to observe cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub user_by_email: u64,
    pub user_by_id: u64,
    pub profile_by_user_id: u64,
}

/// Account store kept in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, UserRecord>,
    profiles: DashMap<String, ProfileRecord>,
    user_by_email: AtomicU64,
    user_by_id: AtomicU64,
    profile_by_user_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn upsert_user(&self, user: UserRecord) {
        self.users.insert(user.id.clone(), user);
    }

    /// Insert or replace a profile.
    pub fn upsert_profile(&self, profile: ProfileRecord) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn remove_profile(&self, user_id: &str) {
        self.profiles.remove(user_id);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            user_by_email: self.user_by_email.load(Ordering::Relaxed),
            user_by_id: self.user_by_id.load(Ordering::Relaxed),
            profile_by_user_id: self.profile_by_user_id.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        self.user_by_email.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        self.user_by_id.fetch_add(1, Ordering::Relaxed);
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn find_profile_by_user_id(&self, user_id: &str) -> StoreResult<Option<ProfileRecord>> {
        self.profile_by_user_id.fetch_add(1, Ordering::Relaxed);
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }
}
