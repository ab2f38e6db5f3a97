//! Session issuing and per-request materialization.

use std::sync::Arc;

use fittrack_cache::CacheStore;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::AuthResult;
use crate::background::BackgroundTasks;
use crate::keys;
use crate::profile::ProfileResolver;
use crate::storage::AccountStore;
use crate::types::{ProfileSnapshot, SessionToken, SessionView, UserIdentity, UserSummary};

/// Builds session tokens and expands them into [`SessionView`]s.
///
/// `materialize` never fails because of the cache. Side effects that are
/// not needed for the response (activity marker, summary backfill) run as
/// tracked background tasks; call [`flush_background`](Self::flush_background)
/// before shutdown.
pub struct SessionMaterializer {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn AccountStore>,
    profiles: ProfileResolver,
    background: BackgroundTasks,
}

impl SessionMaterializer {
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn AccountStore>) -> Self {
        let profiles = ProfileResolver::new(cache.clone(), store.clone());
        Self {
            cache,
            store,
            profiles,
            background: BackgroundTasks::new(),
        }
    }

    pub fn profiles(&self) -> &ProfileResolver {
        &self.profiles
    }

    /// Issue a token for a freshly authenticated user.
    ///
    /// Overwrites the cached summary at `user:{id}:data` and restarts its
    /// 30 day TTL.
    pub async fn issue_token(&self, identity: &UserIdentity) -> SessionToken {
        let summary = UserSummary::from_identity(identity, Some(OffsetDateTime::now_utc()));
        let key = keys::user_summary(&identity.id);

        if let Err(e) = self
            .cache
            .hset_fields(&key, &summary.to_fields(), keys::USER_SUMMARY_TTL)
            .await
        {
            warn!(user_id = %identity.id, error = %e, "Failed to write user summary");
        }

        SessionToken::from(identity)
    }

    /// Expand a token into a session view.
    ///
    /// A profile that cannot be loaded is reported as `None`.
    pub async fn materialize(&self, token: &SessionToken) -> SessionView {
        let (mut view, profile) = self.expand(token).await;
        view.profile = match profile {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %token.id, error = %e, "Session materialized without profile");
                None
            }
        };
        view
    }

    /// Like [`materialize`](Self::materialize), for callers that cannot
    /// proceed without knowing whether a profile exists.
    ///
    /// # Errors
    ///
    /// Returns `ProfileUnavailable` if the profile store cannot be read.
    pub async fn materialize_with_profile(&self, token: &SessionToken) -> AuthResult<SessionView> {
        let (mut view, profile) = self.expand(token).await;
        view.profile = profile?;
        Ok(view)
    }

    /// Wait for outstanding background writes.
    pub async fn flush_background(&self) {
        self.background.flush().await;
    }

    async fn expand(
        &self,
        token: &SessionToken,
    ) -> (SessionView, AuthResult<Option<ProfileSnapshot>>) {
        self.mark_active(&token.id);

        let mut view = SessionView::from(token);
        match self.cache.hget_all(&keys::user_summary(&token.id)).await {
            Ok(fields) => match UserSummary::from_fields(&fields) {
                Some(summary) => view.apply_summary(&summary),
                None => self.backfill_summary(&token.id),
            },
            Err(e) => warn!(user_id = %token.id, error = %e, "User summary unreadable"),
        }

        let profile = self.profiles.resolve(&token.id).await;
        (view, profile)
    }

    fn mark_active(&self, user_id: &str) {
        let cache = self.cache.clone();
        let key = keys::last_active(user_id);
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string();

        self.background.spawn("activity_marker", async move {
            cache.set(&key, &now_ms, keys::ACTIVITY_TTL).await
        });
    }

    fn backfill_summary(&self, user_id: &str) {
        let cache = self.cache.clone();
        let store = self.store.clone();
        let user_id = user_id.to_string();

        self.background.spawn("summary_backfill", async move {
            let Some(user) = store
                .find_user_by_id(&user_id)
                .await
                .map_err(|e| e.to_string())?
            else {
                debug!(user_id, "No user record to backfill summary from");
                return Ok(());
            };

            let summary = UserSummary::from_identity(&user.identity(), None);
            cache
                .hset_fields(
                    &keys::user_summary(&user_id),
                    &summary.to_fields(),
                    keys::USER_SUMMARY_TTL,
                )
                .await
                .map_err(|e| e.to_string())
        });
    }
}
