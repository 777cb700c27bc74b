//! Tests for config file discovery and loading

use std::fs;
use std::path::{Path, PathBuf};
use tandem_config::{ConfigDiscovery, ConfigError, TandemConfig};
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    assert!(discovery.find().is_none());

    let config = discovery.load(None).unwrap();
    assert_eq!(config, TandemConfig::default());
}

#[test]
fn discovers_tandem_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tandem.toml"),
        r#"
build_dir = "dist"
restart_delay_ms = 2500

[server]
entry = "app.js"
watch = ["server"]
"#,
    )
    .unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    let found = discovery.find().unwrap();
    assert_eq!(found.file_name().unwrap(), "tandem.toml");

    let config = discovery.load(None).unwrap();
    assert_eq!(config.build_dir, PathBuf::from("dist"));
    assert_eq!(config.restart_delay_ms, 2500);
    assert_eq!(config.server.entry, PathBuf::from("app.js"));
    assert_eq!(config.server.watch, vec![PathBuf::from("server")]);
    // untouched sections keep their defaults
    assert_eq!(config.server.runtime, TandemConfig::default().server.runtime);
    assert_eq!(config.client, TandemConfig::default().client);
}

#[test]
fn explicit_file_must_exist() {
    let dir = TempDir::new().unwrap();
    let discovery = ConfigDiscovery::new(dir.path());

    let err = discovery.load(Some(Path::new("custom.toml"))).unwrap_err();
    match err {
        ConfigError::NotFound(path) => assert!(path.ends_with("custom.toml")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn explicit_file_is_resolved_against_root() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("custom.toml"), "debounce_ms = 250\n").unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    let config = discovery.load(Some(Path::new("custom.toml"))).unwrap();
    assert_eq!(config.debounce_ms, 250);
    assert_eq!(
        discovery.config_file(Some(Path::new("custom.toml"))),
        Some(dir.path().join("custom.toml"))
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tandem.toml"), "hot_reload_everything = true\n").unwrap();

    let err = ConfigDiscovery::new(dir.path()).load(None).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn wrong_types_are_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tandem.toml"), "restart_delay_ms = \"soon\"\n").unwrap();

    let err = ConfigDiscovery::new(dir.path()).load(None).unwrap_err();
    assert!(err.to_string().contains("failed to load configuration"));
}
