use crate::conf::{ConfigError, ConfigFile, ConfigWarning, ServerSection, ZoneEntry, validate_config};

use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn zone(name: Option<&str>, path: Option<&str>) -> ZoneEntry {
    ZoneEntry {
        name: name.map(str::to_string),
        access_log_path: path.map(PathBuf::from),
    }
}

fn zone_names(file: ConfigFile) -> (Vec<String>, Vec<ConfigWarning>) {
    let validated = validate_config(file).unwrap();
    (
        validated.config.zones.into_iter().map(|z| z.name).collect(),
        validated.warnings,
    )
}

#[test]
fn duplicate_zone_name_is_skipped_with_warning() {
    // Arrange
    let file = ConfigFile {
        server_zones: vec![
            zone(Some("site1"), Some("/a.json")),
            zone(Some("site1"), Some("/b.json")),
        ],
        ..Default::default()
    };

    // Act
    let (names, warnings) = zone_names(file);

    // Assert
    assert_eq!(names, vec!["site1"]);
    assert_eq!(
        warnings,
        vec![ConfigWarning::DuplicateName {
            index: 1,
            name: "site1".to_string()
        }]
    );
}

#[test]
fn duplicate_log_path_is_skipped_with_warning() {
    // Arrange
    let file = ConfigFile {
        server_zones: vec![
            zone(Some("site1"), Some("/a.json")),
            zone(Some("site2"), Some("/a.json")),
            zone(Some("site3"), Some("/c.json")),
        ],
        ..Default::default()
    };

    // Act
    let (names, warnings) = zone_names(file);

    // Assert
    assert_eq!(names, vec!["site1", "site3"]);
    assert_eq!(
        warnings,
        vec![ConfigWarning::DuplicateLogPath {
            index: 1,
            path: PathBuf::from("/a.json")
        }]
    );
}

#[test]
fn entries_missing_fields_are_skipped() {
    // Arrange
    let file = ConfigFile {
        server_zones: vec![
            zone(None, Some("/a.json")),
            zone(Some("site2"), None),
            zone(Some("  "), Some("/c.json")),
            zone(Some("site4"), Some("/d.json")),
        ],
        ..Default::default()
    };

    // Act
    let (names, warnings) = zone_names(file);

    // Assert
    assert_eq!(names, vec!["site4"]);
    assert_eq!(
        warnings,
        vec![
            ConfigWarning::MissingField {
                index: 0,
                field: "name"
            },
            ConfigWarning::MissingField {
                index: 1,
                field: "access_log_path"
            },
            ConfigWarning::EmptyName { index: 2 },
        ]
    );
}

#[test]
fn zero_valid_zones_is_fatal() {
    // Arrange
    let file = ConfigFile {
        server_zones: vec![zone(None, Some("/a.json"))],
        ..Default::default()
    };

    // Act
    let result = validate_config(file);

    // Assert
    assert!(matches!(result, Err(ConfigError::NoZones)));
}

#[test]
fn legacy_single_source_uses_server_zone_name() {
    // Arrange
    let file = ConfigFile {
        access_log_path: Some(PathBuf::from("/var/log/access.json")),
        server_zone: Some("site1".to_string()),
        ..Default::default()
    };

    // Act
    let (names, warnings) = zone_names(file);

    // Assert
    assert_eq!(names, vec!["site1"]);
    assert!(warnings.is_empty());
}

#[test]
fn legacy_source_is_ignored_when_zones_are_listed() {
    // Arrange
    let file = ConfigFile {
        access_log_path: Some(PathBuf::from("/var/log/access.json")),
        server_zones: vec![zone(Some("site1"), Some("/a.json"))],
        ..Default::default()
    };

    // Act
    let (names, warnings) = zone_names(file);

    // Assert
    assert_eq!(names, vec!["site1"]);
    assert_eq!(warnings, vec![ConfigWarning::LegacySourceIgnored]);
}

#[test]
fn blank_bind_addr_is_rejected() {
    // Arrange
    let file = ConfigFile {
        server: ServerSection {
            bind_addr: Some(" ".to_string()),
            bind_port: None,
        },
        server_zones: vec![zone(Some("site1"), Some("/a.json"))],
        ..Default::default()
    };

    // Act
    let result = validate_config(file);

    // Assert
    assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
}

#[test]
fn empty_follow_command_is_rejected() {
    // Arrange
    let file = ConfigFile {
        server_zones: vec![zone(Some("site1"), Some("/a.json"))],
        follow_command: Some(vec![]),
        ..Default::default()
    };

    // Act
    let result = validate_config(file);

    // Assert
    assert!(matches!(result, Err(ConfigError::EmptyFollowCommand)));
}

#[test]
fn ipv6_bind_addr_is_bracketed() {
    // Arrange
    let file = ConfigFile {
        server: ServerSection {
            bind_addr: Some("::1".to_string()),
            bind_port: Some(8081),
        },
        server_zones: vec![zone(Some("site1"), Some("/a.json"))],
        ..Default::default()
    };

    // Act
    let cfg = validate_config(file).unwrap().config;

    // Assert
    assert_eq!(cfg.server.listen_addr(), "[::1]:8081");
}
