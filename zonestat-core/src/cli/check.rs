use crate::conf::{ConfigError, ValidatedConfig, candidate_paths, discover_config, load_config_file};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn check(path: Option<PathBuf>, as_json: bool) -> anyhow::Result<()> {
    let candidates = candidate_paths(path.as_deref());
    let loaded = discover_config(&candidates)
        .ok_or(ConfigError::NotFound {
            attempted: candidates,
        })
        .and_then(|found| load_config_file(&found).map(|cfg| (found, cfg)));

    match loaded {
        Ok((found, cfg)) if as_json => {
            println!("{}", serde_json::to_string_pretty(&check_report(&found, &cfg))?);
            Ok(())
        }
        Ok((found, cfg)) => {
            println!("✔ Config loaded from {}", found.display());
            println!("✔ Listening on {}", cfg.config.server.listen_addr());
            println!("✔ {} server zones", cfg.config.zones.len());
            for zone in &cfg.config.zones {
                println!("    {} <- {}", zone.name, zone.log_path.display());
            }
            for warning in &cfg.warnings {
                println!("⚠ {warning}");
            }
            Ok(())
        }
        Err(err) => {
            print_config_error(&err);
            std::process::exit(1);
        }
    }
}

fn check_report(path: &Path, cfg: &ValidatedConfig) -> serde_json::Value {
    json!({
        "config": path,
        "listen": cfg.config.server.listen_addr(),
        "server_zones": cfg
            .config
            .zones
            .iter()
            .map(|z| json!({ "name": z.name, "access_log_path": z.log_path }))
            .collect::<Vec<_>>(),
        "follow_command": cfg.config.follow.program(),
        "warnings": cfg.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}

fn print_config_error(err: &ConfigError) {
    eprintln!("✘ {err}");
    if let Some(hint) = config_error_hint(err) {
        eprintln!();
        eprintln!("{hint}");
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::NotFound { .. } => Some(
            "Pass a config path, or create ./config.yml.\n\
             \n\
             Example:\n\
             \n\
             server:\n\
             \x20 bind_addr: 127.0.0.1\n\
             \x20 bind_port: 8080\n\
             server_zones:\n\
             \x20 - name: site1\n\
             \x20   access_log_path: /var/log/nginx/site1.access.json",
        ),

        ConfigError::NoZones => Some(
            "Every server zone needs both `name` and `access_log_path`, and names and\n\
             paths must be unique. Entries that break these rules are skipped.",
        ),

        ConfigError::InvalidBindAddr { .. } => Some(
            "server.bind_addr must be a host name or IP address, e.g. 127.0.0.1 or ::1.",
        ),

        ConfigError::EmptyFollowCommand => Some(
            "follow_command is an argument list whose first entry is the program.\n\
             \n\
             Example:\n\
             \n\
             follow_command: [\"tail\", \"-n\", \"0\", \"-F\", \"{path}\"]",
        ),

        _ => None,
    }
}
