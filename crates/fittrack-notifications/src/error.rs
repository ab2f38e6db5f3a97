use fittrack_cache::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// A queue entry is not a valid message for its channel.
    #[error("Malformed message: {0}")]
    Parse(String),

    /// Reading or trimming a channel failed.
    #[error("Channel error: {0}")]
    Channel(String),

    /// The notification sink rejected a notification.
    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CacheError> for NotificationError {
    fn from(e: CacheError) -> Self {
        Self::Channel(e.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
