//! Cache-first profile resolution.

use std::sync::Arc;

use fittrack_cache::{CacheStore, CacheStoreExt};
use tracing::{debug, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::keys;
use crate::storage::{AccountStore, StoreResult};
use crate::types::ProfileSnapshot;

/// Reads profile snapshots from the cache, backfilling from the store.
#[derive(Clone)]
pub struct ProfileResolver {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn AccountStore>,
}

impl ProfileResolver {
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn AccountStore>) -> Self {
        Self { cache, store }
    }

    /// Resolve the profile snapshot for a user.
    ///
    /// A cache hit is returned as-is. On a miss (or an unreadable cache) the
    /// store is queried and the projection written back for 24 hours.
    /// `Ok(None)` means the user has no profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileUnavailable` if the store cannot be read.
    pub async fn resolve(&self, user_id: &str) -> AuthResult<Option<ProfileSnapshot>> {
        let key = keys::profile(user_id);

        match self.cache.get_json::<ProfileSnapshot>(&key).await {
            Ok(Some(snapshot)) => return Ok(Some(snapshot)),
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Profile cache read failed, using store");
            }
        }

        let snapshot = self
            .load(user_id)
            .await
            .map_err(|e| AuthError::profile_unavailable(e.to_string()))?;

        // The backfill completes before `resolve` returns, so a later
        // refresh always wins.
        if let Some(snapshot) = &snapshot
            && let Err(e) = self.cache.set_json(&key, snapshot, keys::PROFILE_TTL).await
        {
            warn!(key = %key, error = %e, "Failed to backfill profile cache");
        }

        Ok(snapshot)
    }

    /// Overwrite the cached snapshot with the store's current profile.
    ///
    /// The key is deleted when the store has no profile or cannot be read,
    /// so the next [`resolve`](Self::resolve) goes to the store.
    pub async fn refresh(&self, user_id: &str) {
        let key = keys::profile(user_id);

        let outcome = match self.load(user_id).await {
            Ok(Some(snapshot)) => self.cache.set_json(&key, &snapshot, keys::PROFILE_TTL).await,
            Ok(None) => {
                debug!(user_id, "No profile in store, dropping cached snapshot");
                self.cache.delete(&key).await
            }
            Err(e) => {
                warn!(user_id, error = %e, "Profile store read failed, dropping cached snapshot");
                self.cache.delete(&key).await
            }
        };

        if let Err(e) = outcome {
            warn!(key = %key, error = %e, "Failed to refresh profile cache");
        }
    }

    async fn load(&self, user_id: &str) -> StoreResult<Option<ProfileSnapshot>> {
        let record = self.store.find_profile_by_user_id(user_id).await?;
        Ok(record.map(|r| r.snapshot()))
    }
}
