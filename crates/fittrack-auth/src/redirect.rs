//! Post-sign-in redirect policy.
//!
//! Redirects outside the application are replaced by the base URL. Signed-in
//! users who have not recorded any body measurements yet are sent to the
//! application root, where onboarding starts.

use url::Url;

use crate::AuthResult;
use crate::error::AuthError;
use crate::profile::ProfileResolver;

pub struct RedirectPolicyGate {
    profiles: ProfileResolver,
}

impl RedirectPolicyGate {
    pub fn new(profiles: ProfileResolver) -> Self {
        Self { profiles }
    }

    /// Decide where to send the user.
    ///
    /// An absolute in-app target is returned byte for byte. A relative
    /// target is NOT passed through unchanged: it is resolved against
    /// `base_url` and returned as an absolute URL (`/workouts` becomes
    /// `{base}/workouts`), both for anonymous and for onboarded users.
    ///
    /// # Errors
    ///
    /// - `Internal` if `base_url` is not an absolute URL
    /// - `ProfileUnavailable` if the profile cannot be resolved
    pub async fn decide(
        &self,
        target_url: &str,
        base_url: &str,
        user_id: Option<&str>,
    ) -> AuthResult<String> {
        let base = Url::parse(base_url)
            .map_err(|e| AuthError::internal(format!("invalid base url '{base_url}': {e}")))?;

        let Some(target) = resolve_within(&base, target_url) else {
            tracing::debug!(target_url, "Redirect outside application, using base url");
            return Ok(base_url.to_string());
        };

        let Some(user_id) = user_id else {
            return Ok(target);
        };

        match self.profiles.resolve(user_id).await? {
            Some(profile) if profile.has_measurements() => Ok(target),
            _ => Ok(app_root(base_url)),
        }
    }
}

/// Resolve `target` against `base`, or `None` when it leaves the base URL.
///
/// Absolute targets come back verbatim, relative ones in resolved form.
fn resolve_within(base: &Url, target: &str) -> Option<String> {
    let resolved = base.join(target).ok()?;
    if resolved.origin() != base.origin() {
        return None;
    }

    let prefix = base.path().trim_end_matches('/');
    let path = resolved.path();
    let under_prefix = prefix.is_empty()
        || path == prefix
        || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'));
    if !under_prefix {
        return None;
    }

    if Url::parse(target).is_ok() {
        Some(target.to_string())
    } else {
        Some(resolved.to_string())
    }
}

fn app_root(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
