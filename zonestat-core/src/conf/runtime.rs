use crate::tail::FollowCommand;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_BIND_PORT: u16 = 8080;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Fully resolved configuration handed to [`start`](crate::server::start).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: Option<String>,
    pub server: ServerConfig,
    pub zones: Vec<ZoneConfig>,
    pub follow: FollowCommand,
    pub retry_backoff: Duration,
    pub shutdown_timeout: Duration,
}

impl RuntimeConfig {
    /// A config with default settings for the given zones.
    pub fn with_zones(zones: Vec<ZoneConfig>) -> Self {
        Self {
            log_level: None,
            server: ServerConfig::default(),
            zones,
            follow: FollowCommand::default(),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub bind_port: u16,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        if self.bind_addr.contains(':') {
            format!("[{}]:{}", self.bind_addr, self.bind_port)
        } else {
            format!("{}:{}", self.bind_addr, self.bind_port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            bind_port: DEFAULT_BIND_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    pub name: String,
    pub log_path: PathBuf,
}

impl ZoneConfig {
    pub fn new(name: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            log_path: log_path.into(),
        }
    }
}
