//! On-disk configuration layout.
//!
//! Every field is optional at this stage. Missing or inconsistent values are
//! resolved (or rejected) by [`validate_config`](crate::conf::validate_config).

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub log_level: Option<String>,
    pub server: ServerSection,
    pub server_zones: Vec<ZoneEntry>,

    /// Single-source form: one log file, optionally named by `server_zone`.
    pub access_log_path: Option<PathBuf>,
    pub server_zone: Option<String>,

    /// Argument vector of the follow process. `{path}` is replaced by the log path.
    pub follow_command: Option<Vec<String>>,
    pub retry_backoff_ms: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_addr: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ZoneEntry {
    pub name: Option<String>,
    pub access_log_path: Option<PathBuf>,
}
