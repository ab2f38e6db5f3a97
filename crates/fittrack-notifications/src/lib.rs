//! Polling consumers for FitTrack's list-backed channels.
//!
//! Producers append JSON entries to the `notifications` and `water-intake`
//! lists; a [`QueueConsumer`] per channel drains them on a fixed interval
//! and turns them into [`NewNotification`]s for a [`NotificationSink`].

pub mod consumer;
pub mod error;
pub mod handlers;
pub mod publisher;
pub mod sink;
pub mod types;

pub use consumer::{
    ChannelHandler, ConsumerHandle, CycleReport, DEFAULT_POLL_INTERVAL, Dispatch, QueueConsumer,
};
pub use error::NotificationError;
pub use handlers::{NotificationHandler, WaterIntakeHandler};
pub use publisher::{CHANNEL_TTL, QueuePublisher};
pub use sink::{InMemorySink, NotificationSink};
pub use types::*;
