use std::{env, sync::Arc};

use anyhow::Context;
use fittrack_notifications::NotificationSink;
use fittrack_server::config::AppConfig;
use fittrack_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use fittrack_server::{AppServices, create_cache_backend};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From FITTRACK_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (fittrack.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (FITTRACK_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    fittrack_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    fittrack_server::observability::apply_logging_level(&cfg.logging.level);

    if let Err(err) = run(cfg).await {
        eprintln!("Worker error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let cache = create_cache_backend(&cfg.redis).await;

    let store = Arc::new(
        fittrack_db_postgres::connect(&cfg.postgres)
            .await
            .context("connecting to PostgreSQL")?,
    );
    tracing::info!(
        url = %fittrack_db_postgres::mask_password(&cfg.postgres.url),
        "Connected to PostgreSQL"
    );

    let services = AppServices::new(&cfg, cache, store.clone());
    let invalidator = services.spawn_invalidator();
    let sink: Arc<dyn NotificationSink> = store;
    let consumers = services.start_consumers(&cfg, sink);
    tracing::info!(consumers = consumers.len(), "Worker started");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    for consumer in consumers {
        consumer.stop().await;
    }
    // Dropping the services closes the event channel and ends the invalidator.
    services.sessions.flush_background().await;
    drop(services);
    if let Err(e) = invalidator.await {
        tracing::warn!(error = %e, "Invalidator task failed");
    }

    tracing::info!("Worker stopped");
    Ok(())
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: FITTRACK_CONFIG
/// 3. Default: fittrack.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    if let Ok(path) = env::var("FITTRACK_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    (DEFAULT_CONFIG_FILE.to_string(), ConfigSource::Default)
}
