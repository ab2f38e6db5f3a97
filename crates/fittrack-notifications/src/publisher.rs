//! Producer side of the channels.

use std::sync::Arc;
use std::time::Duration;

use fittrack_cache::CacheStore;
use serde::Serialize;

use crate::error::NotificationError;

/// Lifetime of a channel with no new entries.
pub const CHANNEL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Appends JSON messages to the tail of a channel.
#[derive(Clone)]
pub struct QueuePublisher {
    cache: Arc<dyn CacheStore>,
}

impl QueuePublisher {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Publish a message. Returns the channel length after the append.
    pub async fn publish<T>(&self, channel: &str, message: &T) -> Result<u64, NotificationError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(message)
            .map_err(|e| NotificationError::Internal(format!("failed to encode message: {e}")))?;
        let len = self.cache.list_append(channel, &raw, CHANNEL_TTL).await?;
        tracing::debug!(channel, len, "Published queue entry");
        Ok(len)
    }
}
