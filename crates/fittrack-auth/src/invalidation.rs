//! Account lifecycle hooks that keep derived cache entries consistent.

use std::sync::Arc;

use fittrack_cache::CacheStore;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::keys;
use crate::profile::ProfileResolver;
use crate::storage::AccountStore;

/// Account lifecycle events published by the account management code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    UserCreated { email: String },
    ProfileUpdated { user_id: String },
    SignedOut { user_id: String },
}

/// Keeps cached user state consistent with the store after writes.
///
/// Cache failures are logged and swallowed; a stale entry ages out with
/// its TTL.
pub struct CacheInvalidator {
    cache: Arc<dyn CacheStore>,
    profiles: ProfileResolver,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn AccountStore>) -> Self {
        let profiles = ProfileResolver::new(cache.clone(), store);
        Self { cache, profiles }
    }

    /// Drop any credential record cached for a reused email.
    pub async fn on_user_created(&self, email: &str) {
        self.delete(&keys::credential(email)).await;
    }

    /// Refresh the cached profile snapshot from the store.
    pub async fn on_profile_updated(&self, user_id: &str) {
        self.profiles.refresh(user_id).await;
    }

    /// Remove the user's activity marker, summary and profile snapshot.
    pub async fn on_sign_out(&self, user_id: &str) {
        for key in [
            keys::last_active(user_id),
            keys::user_summary(user_id),
            keys::profile(user_id),
        ] {
            self.delete(&key).await;
        }
    }

    pub async fn handle(&self, event: &AccountEvent) {
        debug!(event = ?event, "Handling account event");
        match event {
            AccountEvent::UserCreated { email } => self.on_user_created(email).await,
            AccountEvent::ProfileUpdated { user_id } => self.on_profile_updated(user_id).await,
            AccountEvent::SignedOut { user_id } => self.on_sign_out(user_id).await,
        }
    }

    /// Apply events until the channel closes.
    pub async fn run(&self, mut receiver: broadcast::Receiver<AccountEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "Missed account events, affected entries expire by TTL");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Account event channel closed");
                    break;
                }
            }
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }
}
