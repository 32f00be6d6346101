//! Configuration file loading and override precedence.

use querydesk::api;
use querydesk::config::Config;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn file_values_apply_when_nothing_overrides_them() {
    let file = write_config(
        r#"
[api]
base_url = "http://db-console.internal:8080/api"

[editor]
debounce_ms = 120
"#,
    );

    let mut config = Config::load_from_file(file.path()).unwrap();
    config.apply_overrides(None, None, None);

    assert_eq!(config.api.base_url, "http://db-console.internal:8080/api");
    assert_eq!(config.editor.debounce(), Duration::from_millis(120));
    assert!(config.api.validate().is_ok());
    assert_eq!(config.api.display_string(), "db-console.internal:8080");
}

#[test]
fn cli_beats_environment_beats_file() {
    let file = write_config("[api]\nbase_url = \"http://from-file:5000/api\"\n");

    let mut config = Config::load_from_file(file.path()).unwrap();
    config.apply_overrides(None, Some("http://from-env:5000/api".to_string()), None);
    assert_eq!(config.api.base_url, "http://from-env:5000/api");

    config.apply_overrides(
        Some("http://from-cli:5000/api"),
        Some("http://from-env:5000/api".to_string()),
        Some(50),
    );
    assert_eq!(config.api.base_url, "http://from-cli:5000/api");
    assert_eq!(config.editor.debounce_ms, 50);
}

#[test]
fn broken_file_is_a_config_error() {
    let file = write_config("[api\nbase_url = ");
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert_eq!(err.category(), "Configuration Error");
}

#[tokio::test]
async fn http_client_builds_from_config() {
    let file = write_config("[api]\nbase_url = \"http://127.0.0.1:9/api\"\ntimeout_secs = 1\n");
    let config = Config::load_from_file(file.path()).unwrap();
    assert!(api::connect(&config.api).is_ok());
}
