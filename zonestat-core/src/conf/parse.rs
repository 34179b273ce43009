use crate::conf::error::ConfigError;
use crate::conf::file::ConfigFile;
use std::fs;
use std::path::Path;

pub fn parse_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    parse_config_str(path, &s)
}

/// An empty document is a valid (if useless) config; validation rejects it later.
pub fn parse_config_str(path: &Path, s: &str) -> Result<ConfigFile, ConfigError> {
    if s.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(s).map_err(|e| ConfigError::parse(path, e))
}
