//! PostgreSQL backend for FitTrack.
//!
//! [`PgStore`] reads accounts and profiles for `fittrack-auth` and writes
//! notifications produced by `fittrack-notifications`. The tables belong to
//! the web application; [`migrations::run`] only creates them when missing.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod store;

pub use config::PostgresConfig;
pub use error::{PostgresError, Result};
pub use pool::{create_pool, mask_password};
pub use sqlx_postgres::PgPool;
pub use store::PgStore;

/// Create a pool, apply migrations if configured, and wrap it in a store.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn connect(config: &PostgresConfig) -> Result<PgStore> {
    let pool = create_pool(config).await?;
    if config.run_migrations {
        migrations::run(&pool).await?;
    }
    Ok(PgStore::new(pool))
}
