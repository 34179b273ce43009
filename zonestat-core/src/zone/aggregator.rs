use crate::zone::parse::parse_line;
use crate::zone::registry::ZoneWriter;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Input of a zone aggregator.
#[derive(Debug)]
pub enum ZoneCommand {
    /// One raw log line.
    Line(String),
    /// Zero all counters; `ack` fires once the reset is applied.
    Reset { ack: Option<oneshot::Sender<()>> },
    /// Stop processing. Equivalent to closing the channel.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Turns a stream of raw JSON lines into counter updates for one zone.
///
/// Lines are processed strictly in arrival order. Bad lines are logged and
/// skipped; nothing a log line contains can stop the aggregator.
pub struct ZoneAggregator {
    writer: ZoneWriter,
    rx: mpsc::Receiver<ZoneCommand>,
    counted: u64,
    skipped: u64,
}

impl ZoneAggregator {
    pub fn new(writer: ZoneWriter, rx: mpsc::Receiver<ZoneCommand>) -> Self {
        Self {
            writer,
            rx,
            counted: 0,
            skipped: 0,
        }
    }

    pub async fn run(mut self) {
        info!(zone = %self.writer.name(), "zone aggregator started");

        while let Some(cmd) = self.rx.recv().await {
            if self.handle(cmd) == Flow::Stop {
                break;
            }
        }

        info!(
            zone = %self.writer.name(),
            counted = self.counted,
            skipped = self.skipped,
            "zone aggregator stopped"
        );
    }

    pub fn handle(&mut self, cmd: ZoneCommand) -> Flow {
        match cmd {
            ZoneCommand::Line(line) => {
                self.ingest(&line);
                Flow::Continue
            }
            ZoneCommand::Reset { ack } => {
                debug!(zone = %self.writer.name(), "resetting all counters to zero");
                self.writer.reset();
                if let Some(ack) = ack {
                    // The requester may have given up waiting.
                    let _ = ack.send(());
                }
                Flow::Continue
            }
            ZoneCommand::Shutdown => Flow::Stop,
        }
    }

    fn ingest(&mut self, line: &str) {
        match parse_line(line) {
            Ok(status) => {
                self.writer.record(status);
                self.counted += 1;
            }
            Err(e) => {
                self.skipped += 1;
                warn!(
                    zone = %self.writer.name(),
                    error = %e,
                    input = line,
                    "skipping log line"
                );
            }
        }
    }
}
