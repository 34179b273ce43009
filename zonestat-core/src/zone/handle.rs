use crate::zone::aggregator::ZoneCommand;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Lines buffered per zone before the tail supervisor is back-pressured.
pub const ZONE_CHANNEL_CAPACITY: usize = 1_000;

#[derive(Debug, Error)]
#[error("zone '{zone}' aggregator is no longer running")]
pub struct ZoneClosed {
    pub zone: String,
}

/// Sending side of a zone aggregator's input channel.
#[derive(Debug, Clone)]
pub struct ZoneHandle {
    name: String,
    tx: mpsc::Sender<ZoneCommand>,
}

/// Create the input channel for one zone.
pub fn zone_channel(name: impl Into<String>) -> (ZoneHandle, mpsc::Receiver<ZoneCommand>) {
    let (tx, rx) = mpsc::channel(ZONE_CHANNEL_CAPACITY);
    (
        ZoneHandle {
            name: name.into(),
            tx,
        },
        rx,
    )
}

impl ZoneHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw sender used by the tail supervisor.
    pub fn sender(&self) -> mpsc::Sender<ZoneCommand> {
        self.tx.clone()
    }

    pub async fn send_line(&self, line: impl Into<String>) -> Result<(), ZoneClosed> {
        self.send(ZoneCommand::Line(line.into())).await
    }

    /// Ask the aggregator to zero its counters and wait until it has done so.
    ///
    /// The reset is queued behind every line already in the channel.
    pub async fn reset(&self) -> Result<(), ZoneClosed> {
        let (ack, done) = oneshot::channel();
        self.send(ZoneCommand::Reset { ack: Some(ack) }).await?;
        done.await.map_err(|_| self.closed())
    }

    pub async fn shutdown(&self) -> Result<(), ZoneClosed> {
        self.send(ZoneCommand::Shutdown).await
    }

    async fn send(&self, cmd: ZoneCommand) -> Result<(), ZoneClosed> {
        self.tx.send(cmd).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> ZoneClosed {
        ZoneClosed {
            zone: self.name.clone(),
        }
    }
}
