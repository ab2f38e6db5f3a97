use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::NotificationError;
use crate::types::NewNotification;

/// Destination for notifications produced by the consumers.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Persist a notification for later delivery to the user.
    async fn create(&self, notification: NewNotification) -> Result<(), NotificationError>;
}

/// Sink that keeps notifications in memory.
#[derive(Default)]
pub struct InMemorySink {
    created: Mutex<Vec<NewNotification>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications created so far, oldest first.
    pub fn created(&self) -> Vec<NewNotification> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn create(&self, notification: NewNotification) -> Result<(), NotificationError> {
        self.created
            .lock()
            .map_err(|_| NotificationError::Internal("sink lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
