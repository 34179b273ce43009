use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "config.yml";
const USER_CONFIG: &str = "zonestat/config.yml";
const SYSTEM_CONFIG: &str = "/etc/zonestat/config.yml";

/// Config file locations in lookup order.
///
/// An explicitly supplied path comes first, followed by `./config.yml`, the
/// per-user config directory and finally the system-wide location.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(4);

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }

    paths.push(PathBuf::from(".").join(LOCAL_CONFIG));

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join(USER_CONFIG));
    }

    paths.push(PathBuf::from(SYSTEM_CONFIG));
    paths
}

/// Returns the first candidate that exists as a regular file.
pub fn discover_config(candidates: &[PathBuf]) -> Option<PathBuf> {
    for path in candidates {
        if path.is_file() {
            return Some(path.clone());
        }
        tracing::debug!(path = %path.display(), "config file not found");
    }
    None
}
