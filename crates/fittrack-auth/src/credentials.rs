//! Email/password verification with a short-lived credential cache.
//!
//! Lookups go through `user:email:{email}` (10 minutes) before the store.
//! Only positive lookups are cached. Every password mismatch bumps
//! `failed:login:{email}` and resets its 30 minute window; the counter is
//! cleared on success. Nothing here denies a login based on the counter,
//! it is kept for rate limiting in front of this crate.

use std::sync::Arc;

use fittrack_cache::{CacheStore, CacheStoreExt};
use tracing::{debug, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::keys;
use crate::password::{verify_against_dummy, verify_password_blocking};
use crate::storage::{AccountStore, UserRecord};
use crate::types::{Credentials, UserIdentity};

pub struct CredentialVerifier {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn AccountStore>,
}

impl CredentialVerifier {
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn AccountStore>) -> Self {
        Self { cache, store }
    }

    /// Verify an email/password pair.
    ///
    /// # Errors
    ///
    /// - `MissingInput` if either field is absent or empty
    /// - `InvalidCredentials` for an unknown email, an account without a
    ///   password, or a wrong password
    /// - `Storage` if the store lookup fails
    pub async fn verify(&self, credentials: &Credentials) -> AuthResult<UserIdentity> {
        let email = non_empty(credentials.email.as_deref()).ok_or(AuthError::MissingInput)?;
        let password = non_empty(credentials.password.as_deref()).ok_or(AuthError::MissingInput)?;

        let Some(user) = self.lookup(email).await? else {
            verify_against_dummy(password.to_string()).await;
            debug!(email, "Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(hash) = user.password_hash.clone() else {
            verify_against_dummy(password.to_string()).await;
            debug!(user_id = %user.id, "Login rejected: account has no password");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(password.to_string(), hash).await? {
            self.record_failure(email).await;
            debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let failed_key = keys::failed_login(email);
        if let Err(e) = self.cache.delete(&failed_key).await {
            warn!(user_id = %user.id, error = %e, "Failed to clear failed-login counter");
        }

        Ok(user.identity())
    }

    /// Current failed-attempt count for an email, `0` when absent.
    pub async fn failed_attempts(&self, email: &str) -> i64 {
        match self.cache.get(&keys::failed_login(email)).await {
            Ok(Some(raw)) => raw.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "Failed-login counter unreadable");
                0
            }
        }
    }

    async fn lookup(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        let key = keys::credential(email);

        match self.cache.get_json::<UserRecord>(&key).await {
            Ok(Some(user)) => return Ok(Some(user)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Credential cache read failed, using store"),
        }

        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))?;

        if let Some(user) = &user
            && let Err(e) = self.cache.set_json(&key, user, keys::CREDENTIAL_TTL).await
        {
            warn!(user_id = %user.id, error = %e, "Failed to cache credential record");
        }

        Ok(user)
    }

    async fn record_failure(&self, email: &str) {
        let key = keys::failed_login(email);
        match self.cache.incr(&key, keys::FAILED_LOGIN_TTL).await {
            Ok(count) => debug!(email, count, "Recorded failed login"),
            Err(e) => warn!(error = %e, "Failed to record failed login"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
