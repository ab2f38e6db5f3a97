//! # fittrack-auth
//!
//! Credential verification, session materialization and the cache
//! consistency rules around them.
//!
//! ## Overview
//!
//! Every component works against two injected dependencies: a
//! [`fittrack_cache::CacheStore`] holding derived, TTL-bounded entries, and
//! an [`AccountStore`] that is the source of truth. Cache failures are
//! logged and the component falls back to the store; they never reach the
//! caller.
//!
//! - [`CredentialVerifier`] checks email/password pairs and keeps the
//!   failed-login counter.
//! - [`SessionMaterializer`] issues session tokens and expands them into
//!   [`SessionView`]s with the cached summary and profile.
//! - [`CacheInvalidator`] reacts to [`AccountEvent`]s.
//! - [`RedirectPolicyGate`] decides where to send a user after sign-in.
//! - [`SessionCodec`] signs and verifies session tokens.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fittrack_auth::{Credentials, CredentialVerifier, InMemoryStore, SessionMaterializer};
//! use fittrack_cache::MemoryCache;
//!
//! # async fn example() -> fittrack_auth::AuthResult<()> {
//! let cache = Arc::new(MemoryCache::new());
//! let store = Arc::new(InMemoryStore::new());
//!
//! let verifier = CredentialVerifier::new(cache.clone(), store.clone());
//! let sessions = SessionMaterializer::new(cache, store);
//!
//! let identity = verifier
//!     .verify(&Credentials::new("ana@example.com", "s3cret"))
//!     .await?;
//! let token = sessions.issue_token(&identity).await;
//! let view = sessions.materialize(&token).await;
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod credentials;
pub mod error;
pub mod invalidation;
pub mod keys;
pub mod password;
pub mod profile;
pub mod redirect;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

pub use background::BackgroundTasks;
pub use credentials::CredentialVerifier;
pub use error::AuthError;
pub use invalidation::{AccountEvent, CacheInvalidator};
pub use password::{hash_password, verify_password};
pub use profile::ProfileResolver;
pub use redirect::RedirectPolicyGate;
pub use session::SessionMaterializer;
pub use storage::{
    AccountStore, InMemoryStore, ProfileRecord, StoreError, StoreResult, StoreStats, UserRecord,
};
pub use token::{DEFAULT_SESSION_MAX_AGE, SessionCodec};
pub use types::{Credentials, ProfileSnapshot, SessionToken, SessionView, UserIdentity, UserSummary};

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
