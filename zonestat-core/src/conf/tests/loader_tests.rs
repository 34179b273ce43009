use crate::conf::{ConfigError, DEFAULT_RETRY_BACKOFF, load_config, load_config_file};

use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn load_full_config_file() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        r#"
log_level: debug
server:
  bind_addr: 0.0.0.0
  bind_port: 9090
server_zones:
  - name: site1
    access_log_path: /var/log/nginx/site1.json
  - name: site2
    access_log_path: /var/log/nginx/site2.json
follow_command: ["tail", "-n", "0", "--follow=name", "{path}"]
retry_backoff_ms: 500
shutdown_timeout_ms: 1500
"#,
    )
    .unwrap();

    // Act
    let validated = load_config_file(&path).unwrap();
    let cfg = validated.config;

    // Assert
    assert!(validated.warnings.is_empty());
    assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    assert_eq!(cfg.server.listen_addr(), "0.0.0.0:9090");
    assert_eq!(
        cfg.zones
            .iter()
            .map(|z| (z.name.as_str(), z.log_path.clone()))
            .collect::<Vec<_>>(),
        vec![
            ("site1", PathBuf::from("/var/log/nginx/site1.json")),
            ("site2", PathBuf::from("/var/log/nginx/site2.json")),
        ]
    );
    assert_eq!(cfg.follow.program(), "tail");
    assert_eq!(cfg.retry_backoff, Duration::from_millis(500));
    assert_eq!(cfg.shutdown_timeout, Duration::from_millis(1500));
}

#[test]
fn load_applies_defaults() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        "server_zones:\n  - name: site1\n    access_log_path: /tmp/a.json\n",
    )
    .unwrap();

    // Act
    let cfg = load_config_file(&path).unwrap().config;

    // Assert
    assert_eq!(cfg.server.listen_addr(), "127.0.0.1:8080");
    assert_eq!(cfg.retry_backoff, DEFAULT_RETRY_BACKOFF);
    assert!(cfg.log_level.is_none());
}

#[test]
fn load_rejects_invalid_yaml() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "server_zones: [unclosed").unwrap();

    // Act
    let result = load_config_file(&path);

    // Assert
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn load_rejects_empty_file() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "").unwrap();

    // Act
    let result = load_config_file(&path);

    // Assert
    assert!(matches!(result, Err(ConfigError::NoZones)));
}

#[test]
fn load_reports_missing_explicit_file() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.yml");

    // Act
    let result = load_config_file(&path);

    // Assert
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

#[test]
fn load_config_uses_explicit_path_when_present() {
    // Arrange
    let dir = tempdir().unwrap();
    let path = dir.path().join("explicit.yml");
    fs::write(&path, "access_log_path: /tmp/access.json\n").unwrap();

    // Act
    let cfg = load_config(Some(&path)).unwrap().config;

    // Assert
    assert_eq!(cfg.zones.len(), 1);
    assert_eq!(cfg.zones[0].name, "default");
}

#[test]
fn not_found_lists_attempted_paths() {
    // Arrange
    let err = ConfigError::NotFound {
        attempted: vec![PathBuf::from("./a.yml"), PathBuf::from("/etc/b.yml")],
    };

    // Act
    let message = err.to_string();

    // Assert
    assert_eq!(message, "no config file found; tried: ./a.yml; /etc/b.yml");
}
