use std::fmt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Tail,
    Aggregator,
    StatsServer,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Tail => "tail",
            UnitKind::Aggregator => "aggregator",
            UnitKind::StatsServer => "stats-server",
        })
    }
}

/// A spawned task the coordinator is responsible for joining.
pub(crate) struct Unit {
    pub(crate) kind: UnitKind,
    pub(crate) name: String,
    pub(crate) handle: JoinHandle<()>,
}

impl Unit {
    pub(crate) fn new(kind: UnitKind, name: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            kind,
            name: name.into(),
            handle,
        }
    }

    pub(crate) fn label(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }
}

/// Outcome of joining every unit at shutdown.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Units that finished before the deadline.
    pub stopped: Vec<String>,
    /// Units that were aborted because they did not finish in time.
    pub timed_out: Vec<String>,
    /// Units that had panicked.
    pub panicked: Vec<String>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty() && self.panicked.is_empty()
    }

    pub(crate) fn merge(&mut self, other: ShutdownReport) {
        self.stopped.extend(other.stopped);
        self.timed_out.extend(other.timed_out);
        self.panicked.extend(other.panicked);
    }
}

/// Join `units` against a shared deadline. Late units are aborted, not retried.
pub(crate) async fn join_units(units: Vec<Unit>, deadline: Instant) -> ShutdownReport {
    let mut report = ShutdownReport::default();

    for mut unit in units {
        let label = unit.label();
        match timeout_at(deadline, &mut unit.handle).await {
            Ok(Ok(())) => report.stopped.push(label),
            Ok(Err(e)) if e.is_panic() => {
                tracing::error!(unit = %label, error = %e, "unit panicked");
                report.panicked.push(label);
            }
            // Cancelled elsewhere; it is not running any more.
            Ok(Err(_)) => report.stopped.push(label),
            Err(_) => {
                unit.handle.abort();
                report.timed_out.push(label);
            }
        }
    }

    report
}
