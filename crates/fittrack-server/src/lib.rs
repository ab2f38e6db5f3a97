//! FitTrack worker process wiring.
//!
//! Builds the cache backend, the auth components and the queue consumers
//! from an [`AppConfig`]. The binary in `main.rs` only adds signal handling.

pub mod config;
pub mod observability;

use std::sync::Arc;
use std::time::Duration;

use fittrack_auth::{
    AccountEvent, AccountStore, CacheInvalidator, CredentialVerifier, RedirectPolicyGate,
    SessionCodec, SessionMaterializer,
};
use fittrack_cache::{CacheStore, MemoryCache, RedisCache};
use fittrack_notifications::{
    ConsumerHandle, NotificationHandler, NotificationSink, QueueConsumer, QueuePublisher,
    WaterIntakeHandler,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub use config::{AppConfig, RedisConfig};

/// Capacity of the account event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Create the cache backend from configuration.
///
/// Falls back to the in-process cache when Redis is disabled, the pool
/// cannot be built, or the first connection fails.
pub async fn create_cache_backend(config: &RedisConfig) -> Arc<dyn CacheStore> {
    if !config.enabled {
        tracing::info!("Redis disabled, using local cache only");
        return Arc::new(MemoryCache::new());
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let timeout = Some(Duration::from_millis(config.timeout_ms));
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts = deadpool_redis::Timeouts {
        wait: timeout,
        create: timeout,
        recycle: timeout,
    };
    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to local cache."
            );
            return Arc::new(MemoryCache::new());
        }
    };

    let cache = RedisCache::new(pool);
    if cache.is_available().await {
        tracing::info!("Connected to Redis");
        Arc::new(cache)
    } else {
        tracing::warn!("Redis unreachable. Falling back to local cache.");
        Arc::new(MemoryCache::new())
    }
}

/// Auth and queue components sharing one cache and one store.
pub struct AppServices {
    pub cache: Arc<dyn CacheStore>,
    pub verifier: CredentialVerifier,
    pub sessions: SessionMaterializer,
    pub invalidator: Arc<CacheInvalidator>,
    pub gate: RedirectPolicyGate,
    pub codec: SessionCodec,
    pub publisher: QueuePublisher,
    events: broadcast::Sender<AccountEvent>,
}

impl AppServices {
    pub fn new(config: &AppConfig, cache: Arc<dyn CacheStore>, store: Arc<dyn AccountStore>) -> Self {
        let sessions = SessionMaterializer::new(cache.clone(), store.clone());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            verifier: CredentialVerifier::new(cache.clone(), store.clone()),
            invalidator: Arc::new(CacheInvalidator::new(cache.clone(), store)),
            gate: RedirectPolicyGate::new(sessions.profiles().clone()),
            codec: SessionCodec::new(config.auth.secret.as_bytes(), config.auth.session_max_age()),
            publisher: QueuePublisher::new(cache.clone()),
            sessions,
            events,
            cache,
        }
    }

    /// Sender for account events; every subscriber sees each event.
    pub fn events(&self) -> broadcast::Sender<AccountEvent> {
        self.events.clone()
    }

    /// Publish an account event. Returns the number of live subscribers.
    pub fn emit(&self, event: AccountEvent) -> usize {
        match self.events.send(event) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(event = ?e.0, "No invalidation listener for account event");
                0
            }
        }
    }

    /// Spawn the invalidator on a fresh subscription.
    pub fn spawn_invalidator(&self) -> JoinHandle<()> {
        let invalidator = self.invalidator.clone();
        let receiver = self.events.subscribe();
        tokio::spawn(async move { invalidator.run(receiver).await })
    }

    /// Start one consumer per configured channel.
    pub fn start_consumers(
        &self,
        config: &AppConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Vec<ConsumerHandle> {
        if !config.consumers.enabled {
            tracing::info!("Queue consumers disabled");
            return Vec::new();
        }

        let interval = config.consumers.poll_interval();
        vec![
            QueueConsumer::new(
                self.cache.clone(),
                config.consumers.notification_channel.clone(),
                NotificationHandler::new(sink.clone()),
            )
            .with_poll_interval(interval)
            .start(),
            QueueConsumer::new(
                self.cache.clone(),
                config.consumers.water_intake_channel.clone(),
                WaterIntakeHandler::new(sink),
            )
            .with_poll_interval(interval)
            .start(),
        ]
    }
}
