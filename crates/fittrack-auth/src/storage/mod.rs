//! Persistent store interface for account data.
//!
//! The persistent store is the single source of truth for users, credentials
//! and profiles. This crate only reads from it; every cache entry written by
//! the auth components can be rebuilt from these three lookups.
//!
//! # Implementations
//!
//! - [`InMemoryStore`] - process-local store for tests and local runs
//! - `fittrack-db-postgres` - PostgreSQL backend

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{ProfileSnapshot, UserIdentity};

pub use memory::{InMemoryStore, StoreStats};

/// Errors raised by persistent store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid record: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A user account as stored in the persistent store.
///
/// This record also backs the credential cache entry, which is why it is
/// serializable. It must never leave the auth crate as-is: convert it to a
/// [`UserIdentity`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Argon2 PHC hash. `None` for accounts created through federated sign-in.
    #[serde(default, alias = "password")]
    pub password_hash: Option<String>,
}

impl UserRecord {
    /// Identity fields only, without the password hash.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// A user's profile as stored in the persistent store.
///
/// Measurements are stored as free-form text and projected into numbers
/// when cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRecord {
    pub user_id: String,
    pub height: Option<String>,
    pub current_weight: Option<String>,
}

/// Parse a stored measurement. Blank or non-numeric values are absent,
/// never zero.
fn parse_measurement(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl ProfileRecord {
    /// Numeric projection used for the cached profile snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            height: parse_measurement(self.height.as_deref()),
            current_weight: parse_measurement(self.current_weight.as_deref()),
        }
    }
}

/// Read-only access to the persistent account store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Finds a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Finds the profile belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn find_profile_by_user_id(&self, user_id: &str) -> StoreResult<Option<ProfileRecord>>;
}
