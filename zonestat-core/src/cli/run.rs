use crate::conf::{ValidatedConfig, load_config};
use crate::logging::init_logging;
use crate::server;
use anyhow::Context;
use std::path::PathBuf;

/// Load configuration, install logging and run until SIGINT/SIGTERM.
///
/// Logging is installed after the config is read so its `log_level` applies.
pub fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    let loaded = load_config(path.as_deref());

    let level = loaded
        .as_ref()
        .ok()
        .and_then(|v| v.config.log_level.clone());
    init_logging(level.as_deref());

    let ValidatedConfig { config, warnings } =
        loaded.context("failed to load configuration")?;

    for warning in &warnings {
        tracing::warn!(warning = %warning, "configuration warning");
    }

    let report = server::run(config).context("failed to start zonestat")?;

    tracing::info!(
        stopped = report.stopped.len(),
        timed_out = report.timed_out.len(),
        "shutdown complete"
    );
    Ok(())
}
