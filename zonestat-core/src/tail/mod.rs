//! Follow-process supervision.
//!
//! One [`TailSupervisor`] runs per log file. It launches a follow process
//! (`tail -n 0 -F <path>` by default), forwards its stdout lines to the zone
//! aggregator and relaunches it after a fixed backoff whenever it exits for a
//! reason other than shutdown or an interrupt.
//!
//! The flow of one attempt is:
//!
//! spawn follow process
//! stdout -> decode_line -> ZoneCommand::Line -> zone channel
//! stderr -> drain_stderr -> log
//! wait / terminate -> classify_exit
//!

mod command;
mod process;
mod supervisor;

#[cfg(test)]
mod tests;

pub use command::{FollowCommand, PATH_PLACEHOLDER};
pub use process::{ExitKind, classify_exit};
pub use supervisor::{TERMINATE_GRACE, TailSupervisor};
