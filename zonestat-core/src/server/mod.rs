mod error;
mod setup;
mod shutdown;
mod units;


pub use error::StartupError;
pub use setup::{Service, run, start};
pub use shutdown::{ShutdownHandle, ShutdownSignal, SignalListener};
pub use units::{ShutdownReport, UnitKind};
