use std::{env, fs, time::Duration};

use fittrack_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("fittrack.toml");

    let toml_content = r#"
[server]
base_url = "https://fittrack.example.com/app"

[redis]
enabled = false
url = "redis://cache:6379"

[postgres]
url = "postgres://fit:fit@db:5432/fittrack"
pool_size = 3

[auth]
secret = "test-secret"
session_max_age_secs = 3600

[consumers]
poll_interval_ms = 250

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses, unspecified fields keep defaults
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.base_url, "https://fittrack.example.com/app");
    assert!(!cfg.redis.enabled);
    assert_eq!(cfg.redis.pool_size, 10);
    assert_eq!(cfg.postgres.pool_size, 3);
    assert_eq!(cfg.auth.session_max_age(), Duration::from_secs(3600));
    assert_eq!(cfg.consumers.poll_interval(), Duration::from_millis(250));
    assert_eq!(cfg.consumers.notification_channel, "notifications");
    assert_eq!(cfg.consumers.water_intake_channel, "water-intake");
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("FITTRACK__CONSUMERS__POLL_INTERVAL_MS", "1000");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.consumers.poll_interval_ms, 1000);
    unsafe {
        env::remove_var("FITTRACK__CONSUMERS__POLL_INTERVAL_MS");
    }

    // 3) Missing secret should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[postgres]
url = "postgres://localhost/fittrack"

[consumers]
poll_interval_ms = 500
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("auth.secret"));
}
