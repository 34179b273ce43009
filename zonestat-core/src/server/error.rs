use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind stats server to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("zone '{zone}' already has a running aggregator")]
    ZoneWriterTaken { zone: String },

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
