//! Tests for configuration validation.

use std::fs;
use std::path::PathBuf;
use tandem_config::{ConfigError, ConfigValidator, FsValidator, SchemaValidator, TandemConfig};
use tempfile::TempDir;

fn scaffold(root: &std::path::Path) {
    fs::create_dir_all(root.join("scripts/config/webpack")).unwrap();
    fs::write(root.join("scripts/config/webpack/client.js"), "module.exports = {};").unwrap();
    fs::write(root.join("scripts/config/webpack/server.js"), "module.exports = {};").unwrap();
    fs::create_dir_all(root.join("src/server")).unwrap();
}

#[test]
fn defaults_pass_schema_validation() {
    assert!(SchemaValidator.validate(&TandemConfig::default()).is_ok());
}

#[test]
fn empty_commands_are_rejected() {
    let mut config = TandemConfig::default();
    config.client.command.clear();
    let err = SchemaValidator.validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "client.command"));

    let mut config = TandemConfig::default();
    config.server.runtime = vec!["  ".to_string()];
    let err = SchemaValidator.validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.runtime"));
}

#[test]
fn zero_restart_delay_is_rejected() {
    let config = TandemConfig {
        restart_delay_ms: 0,
        ..TandemConfig::default()
    };
    let err = SchemaValidator.validate(&config).unwrap_err();
    assert!(err.to_string().contains("restart_delay_ms"));
}

#[test]
fn root_build_dir_is_rejected() {
    let config = TandemConfig {
        build_dir: PathBuf::from("/"),
        ..TandemConfig::default()
    };
    assert!(SchemaValidator.validate(&config).is_err());
}

#[test]
fn fs_validation_succeeds_for_scaffolded_project() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());

    let config = TandemConfig::default().absolutize(dir.path());
    assert!(FsValidator.validate(&config).is_ok());
}

#[test]
fn fs_validation_reports_missing_bundler_config() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());
    fs::remove_file(dir.path().join("scripts/config/webpack/server.js")).unwrap();

    let config = TandemConfig::default().absolutize(dir.path());
    match FsValidator.validate(&config).unwrap_err() {
        ConfigError::BundlerConfigNotFound { target, path } => {
            assert_eq!(target, "server");
            assert!(path.ends_with("server.js"));
        }
        other => panic!("expected BundlerConfigNotFound, got {other:?}"),
    }
}

#[test]
fn fs_validation_reports_missing_watch_path() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());
    fs::remove_dir(dir.path().join("src/server")).unwrap();

    let config = TandemConfig::default().absolutize(dir.path());
    assert!(matches!(
        FsValidator.validate(&config).unwrap_err(),
        ConfigError::WatchPathNotFound(_)
    ));
}
