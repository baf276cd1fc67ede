//! Unit tests for configuration loading and conversion

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use wae::Config;

#[test]
fn partial_file_keeps_defaults_for_the_rest() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[pagination]
ceiling = 250

[media]
max_attempts = 3
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.pagination.ceiling, 250);
    assert_eq!(config.pagination.window, 10);
    assert_eq!(config.media.max_attempts, 3);
    assert_eq!(config.media.poll_interval_ms, 500);
    assert_eq!(config.extract.media_prefix, "wae");
    assert_eq!(config.archive.output_dir, ".");
}

#[test]
fn out_of_range_values_are_rejected_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[media]\nmax_attempts = 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("Invalid config"), "{}", err);
}

#[test]
fn malformed_toml_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[pagination\nceiling = ").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn saved_config_loads_back_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.pagination.tick_interval_ms = 0;
    config.extract.media_prefix = "family".to_string();
    config.archive.output_dir = "/tmp/exports".to_string();

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn run_options_follow_the_file() {
    let config: Config = toml::from_str(
        r#"
[pagination]
window = 4
ceiling = 80
tick_interval_ms = 0
max_ticks = 0

[media]
poll_interval_ms = 50
max_attempts = 7

[extract]
sequence_base = 100
media_prefix = "chat"
"#,
    )
    .unwrap();

    let options = config.run_options();

    assert_eq!(options.pagination.window, 4);
    assert_eq!(options.pagination.ceiling, 80);
    assert_eq!(options.pagination.tick_interval, Duration::ZERO);
    assert_eq!(options.pagination.max_ticks, None);
    assert_eq!(options.poll.interval, Duration::from_millis(50));
    assert_eq!(options.poll.max_attempts, 7);
    assert_eq!(options.extract.media_prefix, "chat");
    assert_eq!(options.sequence_base, 100);
}

#[test]
fn home_relative_output_directory_is_expanded() {
    let mut config = Config::default();
    config.archive.output_dir = "~/exports".to_string();

    let dir = config.output_directory();

    if let Some(home) = dirs::home_dir() {
        assert_eq!(dir, home.join("exports"));
    }
}
