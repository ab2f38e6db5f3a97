//! # fittrack-cache
//!
//! Key/value cache used as a derived, rebuildable accelerator over the
//! persistent store.
//!
//! ## Backends
//!
//! - **Redis** ([`RedisCache`]): shared across processes, native TTLs,
//!   atomic pipelines for increment-with-expiry.
//! - **Local** ([`MemoryCache`]): single-process DashMap with lazy expiry.
//!   Used when Redis is disabled or unreachable, and in tests.
//!
//! Every write method on [`CacheStore`] takes a TTL. There is no way to
//! persist a key without expiry through this crate.

pub mod error;
pub mod memory;
pub mod redis;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use store::{CacheStore, CacheStoreExt};
