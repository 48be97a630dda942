use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_path(tag: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir().join(format!("movie_catalog_{tag}_{suffix}.toml"))
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let settings = load_settings_from(&temp_settings_path("missing"), no_env);

    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.request_timeout(), Duration::from_secs(10));
}

#[test]
fn file_values_apply_and_unset_keys_keep_defaults() {
    let path = temp_settings_path("file");
    fs::write(&path, "server_url = \"http://catalog.local:9000\"\nread_retries = 5\n")
        .expect("write settings");

    let settings = load_settings_from(&path, no_env);

    assert_eq!(settings.server_url, "http://catalog.local:9000");
    assert_eq!(settings.read_retries, 5);
    assert_eq!(settings.request_timeout_secs, 10);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_settings_path("env");
    fs::write(&path, "server_url = \"http://from-file\"\n").expect("write settings");
    let vars = HashMap::from([
        ("CATALOG_SERVER_URL", "http://from-catalog-env"),
        ("APP__SERVER_URL", "http://from-app-env"),
        ("APP__REQUEST_TIMEOUT_SECS", "3"),
        ("APP__RETRY_BACKOFF_MS", "50"),
    ]);

    let settings = load_settings_from(&path, |name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(settings.server_url, "http://from-app-env");
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    assert_eq!(settings.retry_backoff(), Duration::from_millis(50));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_numeric_env_values_are_ignored() {
    let vars = HashMap::from([("APP__READ_RETRIES", "lots")]);

    let settings = load_settings_from(&temp_settings_path("badnum"), |name| {
        vars.get(name).map(|v| v.to_string())
    });

    assert_eq!(settings.read_retries, 2);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let path = temp_settings_path("malformed");
    fs::write(&path, "server_url = [not toml").expect("write settings");

    let settings = load_settings_from(&path, no_env);

    assert_eq!(settings, ClientSettings::default());

    fs::remove_file(path).expect("cleanup");
}
