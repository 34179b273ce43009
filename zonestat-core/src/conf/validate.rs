use crate::conf::error::ConfigError;
use crate::conf::file::{ConfigFile, ZoneEntry};
use crate::conf::runtime::{
    DEFAULT_BIND_ADDR, DEFAULT_BIND_PORT, DEFAULT_RETRY_BACKOFF, DEFAULT_SHUTDOWN_TIMEOUT,
    RuntimeConfig, ServerConfig, ZoneConfig,
};
use crate::conf::warning::ConfigWarning;
use crate::tail::FollowCommand;
use std::collections::HashSet;
use std::time::Duration;

/// Zone name used by the single-source form when `server_zone` is absent.
const LEGACY_ZONE_NAME: &str = "default";

pub struct ValidatedConfig {
    pub config: RuntimeConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolve a parsed config file into a [`RuntimeConfig`].
///
/// Zone entries with missing fields or a reused name/path are dropped and
/// reported as warnings. Ending up with zero zones is fatal.
pub fn validate_config(file: ConfigFile) -> Result<ValidatedConfig, ConfigError> {
    let mut warnings = Vec::new();

    let entries = if file.server_zones.is_empty() {
        file.access_log_path
            .map(|path| ZoneEntry {
                name: Some(
                    file.server_zone
                        .unwrap_or_else(|| LEGACY_ZONE_NAME.to_string()),
                ),
                access_log_path: Some(path),
            })
            .into_iter()
            .collect()
    } else {
        if file.access_log_path.is_some() {
            warnings.push(ConfigWarning::LegacySourceIgnored);
        }
        file.server_zones
    };

    let zones = resolve_zones(entries, &mut warnings);
    if zones.is_empty() {
        return Err(ConfigError::NoZones);
    }

    let server = resolve_server(file.server.bind_addr, file.server.bind_port)?;

    let follow = match file.follow_command {
        Some(argv) => FollowCommand::from_argv(argv).ok_or(ConfigError::EmptyFollowCommand)?,
        None => FollowCommand::default(),
    };

    Ok(ValidatedConfig {
        config: RuntimeConfig {
            log_level: file.log_level,
            server,
            zones,
            follow,
            retry_backoff: file
                .retry_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RETRY_BACKOFF),
            shutdown_timeout: file
                .shutdown_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT),
        },
        warnings,
    })
}

pub(crate) fn resolve_zones(
    entries: Vec<ZoneEntry>,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<ZoneConfig> {
    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    let mut zones = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let Some(name) = entry.name else {
            warnings.push(ConfigWarning::MissingField {
                index,
                field: "name",
            });
            continue;
        };
        let Some(log_path) = entry.access_log_path else {
            warnings.push(ConfigWarning::MissingField {
                index,
                field: "access_log_path",
            });
            continue;
        };

        let name = name.trim().to_string();
        if name.is_empty() {
            warnings.push(ConfigWarning::EmptyName { index });
            continue;
        }
        if names.contains(&name) {
            warnings.push(ConfigWarning::DuplicateName { index, name });
            continue;
        }
        if paths.contains(&log_path) {
            warnings.push(ConfigWarning::DuplicateLogPath {
                index,
                path: log_path,
            });
            continue;
        }

        names.insert(name.clone());
        paths.insert(log_path.clone());
        zones.push(ZoneConfig { name, log_path });
    }

    zones
}

fn resolve_server(addr: Option<String>, port: Option<u16>) -> Result<ServerConfig, ConfigError> {
    let bind_addr = addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    if bind_addr.trim().is_empty() || bind_addr.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidBindAddr { addr: bind_addr });
    }

    Ok(ServerConfig {
        bind_addr,
        bind_port: port.unwrap_or(DEFAULT_BIND_PORT),
    })
}
