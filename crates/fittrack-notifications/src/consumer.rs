//! Polling consumer for list-backed channels.
//!
//! Each cycle reads the whole list, dispatches every entry and then trims
//! exactly the number of entries it read. Producers only append at the
//! tail, so entries pushed while a cycle runs survive the trim and are
//! picked up by the next cycle. A crash between dispatch and trim
//! redelivers the batch (at-least-once).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fittrack_cache::CacheStore;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::error::NotificationError;

/// Default time between two polls of a channel.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome of handling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Delivered,
    /// The message was valid but carried nothing to act on.
    Skipped,
}

/// Processes the messages of one channel.
#[async_trait]
pub trait ChannelHandler: Send + Sync + 'static {
    type Message: DeserializeOwned + Send;

    async fn handle(&self, message: Self::Message) -> Result<Dispatch, NotificationError>;
}

/// Counters for one poll/dispatch/trim cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub polled: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub failed: usize,
}

pub struct QueueConsumer<H: ChannelHandler> {
    cache: Arc<dyn CacheStore>,
    channel: String,
    handler: H,
    poll_interval: Duration,
}

impl<H: ChannelHandler> QueueConsumer<H> {
    pub fn new(cache: Arc<dyn CacheStore>, channel: impl Into<String>, handler: H) -> Self {
        Self {
            cache,
            channel: channel.into(),
            handler,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Returns `Channel` if the list cannot be read or trimmed. Per-message
    /// failures are logged and counted, never returned.
    pub async fn run_cycle(&self) -> Result<CycleReport, NotificationError> {
        let entries = self.cache.list_range(&self.channel, 0, -1).await?;
        let mut report = CycleReport {
            polled: entries.len(),
            ..CycleReport::default()
        };

        if entries.is_empty() {
            return Ok(report);
        }

        for raw in entries {
            let message = match serde_json::from_str::<H::Message>(&raw)
                .map_err(NotificationError::from)
            {
                Ok(message) => message,
                Err(e) => {
                    warn!(channel = %self.channel, error = %e, "Dropping malformed queue entry");
                    report.malformed += 1;
                    continue;
                }
            };

            match self.handler.handle(message).await {
                Ok(Dispatch::Delivered) => report.dispatched += 1,
                Ok(Dispatch::Skipped) => report.skipped += 1,
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "Failed to handle queue entry");
                    report.failed += 1;
                }
            }
        }

        self.cache
            .list_trim(&self.channel, report.polled as isize, -1)
            .await?;

        Ok(report)
    }

    /// Spawn the polling loop.
    ///
    /// A cycle that is running when [`ConsumerHandle::stop`] is called
    /// finishes before the loop exits. Ticks missed during a slow cycle are
    /// delayed, never bursted. Dropping the returned handle stops the loop
    /// the same way.
    #[must_use = "dropping the handle stops the consumer"]
    pub fn start(self) -> ConsumerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let channel = self.channel.clone();

        let task = tokio::spawn(async move {
            info!(
                channel = %self.channel,
                poll_interval_ms = self.poll_interval.as_millis() as u64,
                "Queue consumer started"
            );

            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.run_cycle().await {
                            Ok(report) if report.polled > 0 => {
                                info!(
                                    channel = %self.channel,
                                    polled = report.polled,
                                    dispatched = report.dispatched,
                                    skipped = report.skipped,
                                    malformed = report.malformed,
                                    failed = report.failed,
                                    "Processed queue entries"
                                );
                            }
                            Ok(_) => debug!(channel = %self.channel, "Queue empty"),
                            Err(e) => {
                                error!(channel = %self.channel, error = %e, "Queue cycle aborted");
                            }
                        }
                    }
                    result = shutdown_rx.changed() => {
                        match result {
                            Ok(()) if *shutdown_rx.borrow() => {
                                info!(channel = %self.channel, "Queue consumer shutting down");
                                break;
                            }
                            Ok(()) => {}
                            Err(_) => {
                                info!(channel = %self.channel, "Consumer handle dropped, shutting down");
                                break;
                            }
                        }
                    }
                }
            }
        });

        ConsumerHandle {
            channel,
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running consumer loop.
#[must_use = "dropping the handle stops the consumer"]
pub struct ConsumerHandle {
    channel: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ConsumerHandle {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(channel = %self.channel, error = %e, "Queue consumer task failed");
        }
    }
}
