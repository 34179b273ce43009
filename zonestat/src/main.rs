use clap::Parser;
use std::path::PathBuf;
use zonestat_core::cli::{self, Command};
use zonestat_core::logging::install_panic_hook;

#[derive(Parser, Debug)]
#[command(
    name = "zonestat",
    version,
    about = "zonestat: per-zone HTTP status counters from JSON access logs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Check { config, json }) => {
            if let Err(e) = cli::check(config, json) {
                eprintln!("check error: {}", error_chain(&e).join(": "));
                std::process::exit(1);
            }
        }

        Some(Command::Run { config }) => run(config),

        None => run(None),
    }
}

fn run(config: Option<PathBuf>) {
    install_panic_hook();

    if let Err(e) = cli::run(config) {
        tracing::error!(error = ?e, causes = ?error_chain(&e), "zonestat failed");
        std::process::exit(1);
    }
}

/// Every message in the error's source chain, outermost first.
fn error_chain(e: &anyhow::Error) -> Vec<String> {
    e.chain().map(|cause| cause.to_string()).collect()
}
