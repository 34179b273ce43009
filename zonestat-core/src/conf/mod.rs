mod discover;
mod error;
mod file;
mod loader;
mod parse;
mod runtime;
mod validate;
mod warning;

#[cfg(test)]
mod tests;

pub use discover::{candidate_paths, discover_config};
pub use error::ConfigError;
pub use file::{ConfigFile, ServerSection, ZoneEntry};
pub use loader::{load_config, load_config_file};
pub use runtime::{
    DEFAULT_BIND_ADDR, DEFAULT_BIND_PORT, DEFAULT_RETRY_BACKOFF, DEFAULT_SHUTDOWN_TIMEOUT,
    RuntimeConfig, ServerConfig, ZoneConfig,
};
pub use validate::{ValidatedConfig, validate_config};
pub use warning::ConfigWarning;
