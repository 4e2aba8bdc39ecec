use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use ts43_config::{ConfigLoadError, ConfigLoader, ConfigSource};

const TOML_CONFIG: &str = r#"
[server]
url = "https://es.example.com/ts43"
request_timeout = "45s"

[carrier]
needs_ims_provisioning = true

[storage]
dir = "/var/lib/ts43"
"#;

fn no_vars() -> Vec<(&'static str, &'static str)> {
    Vec::new()
}

#[test]
fn defaults_when_nothing_is_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let load = ConfigLoader::with_vars(no_vars())
        .base_dir(dir.path())
        .load()
        .expect("load");

    assert_eq!(load.source, ConfigSource::Default);
    assert_eq!(load.config.server.url, None);
    assert_eq!(load.config.server.request_timeout, Duration::from_secs(30));
    assert_eq!(load.config.storage.dir, None);
}

#[test]
fn default_candidate_file_is_picked_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("config")).expect("mkdir");
    let path = dir.path().join("config/ts43.toml");
    fs::write(&path, TOML_CONFIG).expect("write");

    let load = ConfigLoader::with_vars(no_vars())
        .base_dir(dir.path())
        .load()
        .expect("load");

    assert_eq!(load.source, ConfigSource::File(path));
    assert_eq!(
        load.config.server.url.as_deref(),
        Some("https://es.example.com/ts43")
    );
    assert_eq!(load.config.server.request_timeout, Duration::from_secs(45));
    assert!(load.config.carrier.needs_ims_provisioning);
    assert_eq!(load.config.storage.dir, Some(PathBuf::from("/var/lib/ts43")));
}

#[test]
fn env_path_wins_over_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("ts43.toml"), TOML_CONFIG).expect("write");
    fs::write(
        dir.path().join("other.json"),
        r#"{"server": {"url": "http://localhost:8080"}}"#,
    )
    .expect("write");

    let load = ConfigLoader::with_vars([("TS43_CONFIG_PATH", "other.json")])
        .base_dir(dir.path())
        .load()
        .expect("load");

    assert_eq!(
        load.source,
        ConfigSource::EnvPath(dir.path().join("other.json"))
    );
    assert_eq!(
        load.config.server.url.as_deref(),
        Some("http://localhost:8080")
    );
    assert!(!load.config.carrier.needs_ims_provisioning);
}

#[test]
fn inline_json_is_used_without_a_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("ts43.toml"), TOML_CONFIG).expect("write");

    let load = ConfigLoader::with_vars([(
        "TS43_CONFIG_JSON",
        r#"{"carrier": {"needs_ims_provisioning": true, "notification_token": "push"}}"#,
    )])
    .base_dir(dir.path())
    .load()
    .expect("load");

    assert_eq!(load.source, ConfigSource::EnvInline);
    assert!(load.config.carrier.needs_ims_provisioning);
    assert_eq!(load.config.carrier.notification_token.as_deref(), Some("push"));
    assert_eq!(load.config.server.url, None);
}

#[test]
fn individual_variables_override_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("ts43.toml"), TOML_CONFIG).expect("write");

    let load = ConfigLoader::with_vars([
        ("TS43_SERVER_URL", "https://override.example.com"),
        ("TS43_NEEDS_IMS_PROVISIONING", "off"),
        ("TS43_STORAGE_DIR", "state"),
        ("TS43_REQUEST_TIMEOUT", "2m"),
    ])
    .base_dir(dir.path())
    .load()
    .expect("load");

    assert_eq!(
        load.config.server.url.as_deref(),
        Some("https://override.example.com")
    );
    assert!(!load.config.carrier.needs_ims_provisioning);
    assert_eq!(load.config.storage.dir, Some(dir.path().join("state")));
    assert_eq!(load.config.server.request_timeout, Duration::from_secs(120));
}

#[test]
fn unknown_extension_falls_back_from_toml_to_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("settings.conf"),
        r#"{"server": {"request_timeout": "10s"}}"#,
    )
    .expect("write");

    let load = ConfigLoader::with_vars([("TS43_CONFIG_PATH", "settings.conf")])
        .base_dir(dir.path())
        .load()
        .expect("load");

    assert_eq!(load.config.server.request_timeout, Duration::from_secs(10));
}

#[test]
fn invalid_inputs_are_errors() {
    let dir = tempfile::tempdir().expect("tempdir");

    let err = ConfigLoader::with_vars([("TS43_NEEDS_IMS_PROVISIONING", "sometimes")])
        .base_dir(dir.path())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::InvalidValue { .. }));

    let err = ConfigLoader::with_vars([("TS43_SERVER_URL", "mailto:ops@example.com")])
        .base_dir(dir.path())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::InvalidValue { .. }));

    let err = ConfigLoader::with_vars([("TS43_CONFIG_PATH", "missing.toml")])
        .base_dir(dir.path())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Read { .. }));

    let err = ConfigLoader::with_vars([("TS43_CONFIG_JSON", "{not json")])
        .base_dir(dir.path())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}
