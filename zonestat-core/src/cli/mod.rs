mod check;
mod run;

pub use check::*;
pub use run::*;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow the configured access logs and serve zone stats (default)
    Run {
        /// Path to the config file; searched for when omitted
        config: Option<PathBuf>,
    },

    /// Validate configuration and exit
    Check {
        /// Path to the config file; searched for when omitted
        config: Option<PathBuf>,

        /// Print the resolved configuration as JSON
        #[arg(long)]
        json: bool,
    },
}
