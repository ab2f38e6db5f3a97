//! Handlers for the two FitTrack channels.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::consumer::{ChannelHandler, Dispatch};
use crate::error::NotificationError;
use crate::sink::NotificationSink;
use crate::types::{
    NewNotification, NotificationEnvelope, WATER_GOAL_MESSAGE, WATER_GOAL_TITLE, WATER_KIND,
    WaterIntakeUpdate,
};

/// Forwards queued notifications to the sink.
pub struct NotificationHandler {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationHandler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ChannelHandler for NotificationHandler {
    type Message = NotificationEnvelope;

    async fn handle(&self, message: NotificationEnvelope) -> Result<Dispatch, NotificationError> {
        let (Some(user_id), Some(body)) = (
            message.user_id.filter(|id| !id.is_empty()),
            message.notification,
        ) else {
            debug!("Notification entry without user or body");
            return Ok(Dispatch::Skipped);
        };

        info!(user_id = %user_id, title = %body.title, "Creating notification");
        self.sink
            .create(NewNotification {
                user_id,
                title: body.title,
                message: body.message,
                kind: body.kind,
            })
            .await?;

        Ok(Dispatch::Delivered)
    }
}

/// Emits a notification whenever an update reports a reached water goal.
///
/// Repeated qualifying updates produce repeated notifications.
pub struct WaterIntakeHandler {
    sink: Arc<dyn NotificationSink>,
}

impl WaterIntakeHandler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ChannelHandler for WaterIntakeHandler {
    type Message = WaterIntakeUpdate;

    async fn handle(&self, message: WaterIntakeUpdate) -> Result<Dispatch, NotificationError> {
        let reached = message.goal_reached();
        let Some(user_id) = message.user_id.filter(|id| !id.is_empty()) else {
            return Ok(Dispatch::Skipped);
        };
        if !reached {
            return Ok(Dispatch::Skipped);
        }

        info!(user_id = %user_id, "Water goal reached");
        self.sink
            .create(NewNotification {
                user_id,
                title: WATER_GOAL_TITLE.to_string(),
                message: WATER_GOAL_MESSAGE.to_string(),
                kind: WATER_KIND.to_string(),
            })
            .await?;

        Ok(Dispatch::Delivered)
    }
}
