use thiserror::Error;

/// Errors raised by cache backends.
///
/// Callers in this workspace treat every variant as non-fatal: a failing
/// cache degrades to the persistent-store path.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache pool error: {0}")]
    Pool(String),

    #[error("Cache command error: {0}")]
    Command(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<::redis::RedisError> for CacheError {
    fn from(e: ::redis::RedisError) -> Self {
        CacheError::Command(e.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        CacheError::Pool(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
