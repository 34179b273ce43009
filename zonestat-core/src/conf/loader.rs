use crate::conf::discover::{candidate_paths, discover_config};
use crate::conf::error::ConfigError;
use crate::conf::parse::parse_config_file;
use crate::conf::validate::{ValidatedConfig, validate_config};
use std::path::Path;

/// Discover, parse and validate the configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<ValidatedConfig, ConfigError> {
    let candidates = candidate_paths(explicit);

    let path = discover_config(&candidates).ok_or_else(|| ConfigError::NotFound {
        attempted: candidates.clone(),
    })?;

    load_config_file(&path)
}

pub fn load_config_file(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    //--------------------------------------------------------------------------
    // Hard fail: IO and parsing
    //--------------------------------------------------------------------------
    let file = parse_config_file(path)?;

    //--------------------------------------------------------------------------
    // Resolve zones (soft fail per entry, hard fail when none remain)
    //--------------------------------------------------------------------------
    validate_config(file)
}
