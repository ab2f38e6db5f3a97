//! Error types for the PostgreSQL backend.

use fittrack_auth::StoreError;
use fittrack_notifications::NotificationError;

#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::error::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<PostgresError> for NotificationError {
    fn from(err: PostgresError) -> Self {
        NotificationError::Sink(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PostgresError>;
