use std::path::PathBuf;
use thiserror::Error;

/// A non-fatal configuration problem. The offending entry is skipped.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("server zone #{index} is missing '{field}'; skipping")]
    MissingField { index: usize, field: &'static str },

    #[error("server zone #{index} has an empty name; skipping")]
    EmptyName { index: usize },

    #[error("server zone #{index} reuses name '{name}'; skipping")]
    DuplicateName { index: usize, name: String },

    #[error("server zone #{index} reuses log path {}; skipping", .path.display())]
    DuplicateLogPath { index: usize, path: PathBuf },

    #[error("access_log_path and server_zones are both set; using server_zones")]
    LegacySourceIgnored,
}
