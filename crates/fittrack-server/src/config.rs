use std::time::Duration;

use fittrack_db_postgres::PostgresConfig;
use fittrack_notifications::{NOTIFICATION_CHANNEL, WATER_INTAKE_CHANNEL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Queue consumer configuration
    #[serde(default)]
    pub consumers: ConsumersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if url::Url::parse(&self.server.base_url).is_err() {
            return Err("server.base_url must be an absolute URL".into());
        }
        if self.redis.enabled && self.redis.pool_size == 0 {
            return Err("redis.pool_size must be > 0".into());
        }
        if self.postgres.pool_size == 0 {
            return Err("postgres.pool_size must be > 0".into());
        }
        if self.auth.secret.trim().is_empty() {
            return Err("auth.secret must be set".into());
        }
        if self.auth.session_max_age_secs == 0 {
            return Err("auth.session_max_age_secs must be > 0".into());
        }
        if self.consumers.poll_interval_ms == 0 {
            return Err("consumers.poll_interval_ms must be > 0".into());
        }
        if self.consumers.notification_channel == self.consumers.water_intake_channel {
            return Err("consumers channels must be distinct".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Public URL of the web application, used by the redirect policy.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable Redis. Without it the cache is local to this process.
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    false
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens.
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_session_max_age_secs")]
    pub session_max_age_secs: u64,
}

fn default_session_max_age_secs() -> u64 {
    fittrack_auth::DEFAULT_SESSION_MAX_AGE.as_secs()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            session_max_age_secs: default_session_max_age_secs(),
        }
    }
}

impl AuthConfig {
    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumersConfig {
    #[serde(default = "default_consumers_enabled")]
    pub enabled: bool,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_notification_channel")]
    pub notification_channel: String,

    #[serde(default = "default_water_intake_channel")]
    pub water_intake_channel: String,
}

fn default_consumers_enabled() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_notification_channel() -> String {
    NOTIFICATION_CHANNEL.to_string()
}

fn default_water_intake_channel() -> String {
    WATER_INTAKE_CHANNEL.to_string()
}

impl Default for ConsumersConfig {
    fn default() -> Self {
        Self {
            enabled: default_consumers_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            notification_channel: default_notification_channel(),
            water_intake_channel: default_water_intake_channel(),
        }
    }
}

impl ConsumersConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file name.
    pub const DEFAULT_CONFIG_FILE: &str = "fittrack.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., FITTRACK__REDIS__URL=redis://cache:6379
        builder = builder.add_source(
            Environment::with_prefix("FITTRACK")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.secret = "s3cret".into();
        cfg
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.consumers.poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.consumers.notification_channel, "notifications");
        assert_eq!(cfg.consumers.water_intake_channel, "water-intake");
        assert_eq!(cfg.auth.session_max_age(), Duration::from_secs(30 * 24 * 60 * 60));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.contains("auth.secret"));

        let mut cfg = valid();
        cfg.consumers.poll_interval_ms = 0;
        assert!(cfg.validate().unwrap_err().contains("poll_interval_ms"));

        let mut cfg = valid();
        cfg.postgres.pool_size = 0;
        assert!(cfg.validate().unwrap_err().contains("postgres.pool_size"));

        let mut cfg = valid();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().unwrap_err().contains("logging.level"));

        let mut cfg = valid();
        cfg.server.base_url = "/relative".into();
        assert!(cfg.validate().unwrap_err().contains("base_url"));
    }
}
