//! Identity, session and profile types shared by the auth components.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Sign-in form input. Missing and empty fields are treated the same.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

/// Authenticated user identity. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Claims carried by the client across requests.
///
/// Created at sign-in, consumed by every request needing identity, never
/// persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&UserIdentity> for SessionToken {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            image: identity.image.clone(),
        }
    }
}

/// Cached numeric view of a user's profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
}

impl ProfileSnapshot {
    /// `false` means onboarding has not been completed.
    #[must_use]
    pub fn has_measurements(&self) -> bool {
        self.height.is_some() || self.current_weight.is_some()
    }
}

/// Session as seen by request handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub profile: Option<ProfileSnapshot>,
}

impl From<&SessionToken> for SessionView {
    fn from(token: &SessionToken) -> Self {
        Self {
            id: token.id.clone(),
            email: token.email.clone(),
            name: token.name.clone(),
            image: token.image.clone(),
            profile: None,
        }
    }
}

impl SessionView {
    /// Refresh display fields from a cached summary.
    pub fn apply_summary(&mut self, summary: &UserSummary) {
        if !summary.email.is_empty() {
            self.email = summary.email.clone();
        }
        self.name = summary.name.clone();
        self.image = summary.image.clone();
    }
}

/// Cached mirror of a user record, stored as a hash at `user:{id}:data`.
///
/// Every field is always written (empty string for "absent") so that a
/// hash write fully replaces the previous summary.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub last_login_at: Option<OffsetDateTime>,
}

fn non_empty(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields.get(name).filter(|v| !v.is_empty()).cloned()
}

impl UserSummary {
    pub fn from_identity(identity: &UserIdentity, last_login_at: Option<OffsetDateTime>) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            image: identity.image.clone(),
            last_login_at,
        }
    }

    /// Hash fields for a full overwrite.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let last_login = self
            .last_login_at
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_default();
        vec![
            ("id", self.id.clone()),
            ("email", self.email.clone()),
            ("name", self.name.clone().unwrap_or_default()),
            ("image", self.image.clone().unwrap_or_default()),
            ("lastLogin", last_login),
        ]
    }

    /// Decode a cached hash. Returns `None` for an empty (missing) hash.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            id: non_empty(fields, "id").unwrap_or_default(),
            email: non_empty(fields, "email").unwrap_or_default(),
            name: non_empty(fields, "name"),
            image: non_empty(fields, "image"),
            last_login_at: non_empty(fields, "lastLogin")
                .and_then(|s| OffsetDateTime::parse(&s, &Rfc3339).ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> UserIdentity {
        UserIdentity {
            id: "u1".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_summary_fields_round_trip() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let summary = UserSummary::from_identity(&identity(), Some(at));
        let fields: HashMap<String, String> = summary
            .to_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        assert_eq!(fields["image"], "");
        assert_eq!(UserSummary::from_fields(&fields), Some(summary));
    }

    #[test]
    fn test_empty_hash_is_missing_summary() {
        assert_eq!(UserSummary::from_fields(&HashMap::new()), None);
    }

    #[test]
    fn test_apply_summary_overrides_display_fields() {
        let token = SessionToken::from(&identity());
        let mut view = SessionView::from(&token);
        let summary = UserSummary {
            id: "u1".to_string(),
            email: "new@example.com".to_string(),
            name: None,
            image: Some("https://img/1.png".to_string()),
            last_login_at: None,
        };
        view.apply_summary(&summary);

        assert_eq!(view.email, "new@example.com");
        assert_eq!(view.name, None);
        assert_eq!(view.image.as_deref(), Some("https://img/1.png"));
    }

    #[test]
    fn test_profile_snapshot_json_shape() {
        let snap = ProfileSnapshot {
            height: Some(170.0),
            current_weight: None,
        };
        assert_eq!(serde_json::to_string(&snap).unwrap(), r#"{"height":170.0}"#);
        assert!(snap.has_measurements());
        assert!(!ProfileSnapshot::default().has_measurements());

        let parsed: ProfileSnapshot = serde_json::from_str(r#"{"currentWeight":70.5}"#).unwrap();
        assert_eq!(parsed.current_weight, Some(70.5));
    }
}
