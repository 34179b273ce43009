use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::watch;

/// Broadcasts the single, one-way shutdown transition to every unit.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

/// Receiving side of [`ShutdownHandle`]. Cheap to clone; one per unit.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Idempotent; later calls are no-ops.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("shutdown signaled");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait for SIGINT or SIGTERM on `signals`, then trigger shutdown.
    ///
    /// Returns early, without triggering, if shutdown was requested some other way.
    pub async fn trigger_on_signal(&self, mut signals: SignalListener) {
        let mut stopped = self.signal();

        tokio::select! {
            _ = signals.interrupt.recv() => tracing::info!("SIGINT received"),
            _ = signals.terminate.recv() => tracing::info!("SIGTERM received"),
            _ = stopped.triggered() => return,
        }

        self.trigger();
    }
}

/// SIGINT and SIGTERM streams.
///
/// Registering replaces the default disposition, so register before spawning
/// anything: a signal that arrives in between is buffered instead of killing
/// the process.
pub struct SignalListener {
    interrupt: Signal,
    terminate: Signal,
}

impl SignalListener {
    /// Must be called from within a Tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been triggered, or the handle is gone.
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}
