use crate::api::{StatsHandler, serve};
use crate::conf::RuntimeConfig;
use crate::server::error::StartupError;
use crate::server::shutdown::{ShutdownHandle, SignalListener};
use crate::server::units::{ShutdownReport, Unit, UnitKind, join_units};
use crate::tail::TailSupervisor;
use crate::zone::{ZoneAggregator, ZoneHandle, ZoneRegistry, zone_channel};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tokio::time::Instant;

/// A running set of tail supervisors, zone aggregators and the stats server.
pub struct Service {
    local_addr: SocketAddr,
    registry: ZoneRegistry,
    zones: Vec<ZoneHandle>,
    shutdown: ShutdownHandle,
    shutdown_timeout: Duration,
    tails: Vec<Unit>,
    aggregators: Vec<Unit>,
    stats_server: Unit,
}

/// Run until SIGINT/SIGTERM, then shut down in order.
///
/// Builds its own multi-threaded runtime and blocks the calling thread.
pub fn run(config: RuntimeConfig) -> Result<ShutdownReport, StartupError> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("zonestat")
        .build()
        .map_err(StartupError::Runtime)?;

    runtime.block_on(async move {
        let signals = SignalListener::register().map_err(StartupError::Signals)?;
        let service = start(config).await?;

        service.shutdown_handle().trigger_on_signal(signals).await;

        Ok(service.stop().await)
    })
}

/// Bind the stats server and spawn every unit.
///
/// Binding happens first, so a bind failure leaves nothing running.
pub async fn start(config: RuntimeConfig) -> Result<Service, StartupError> {
    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: listen_addr.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        addr: listen_addr,
        source,
    })?;

    let shutdown = ShutdownHandle::new();
    let registry = ZoneRegistry::new(config.zones.iter().map(|z| z.name.clone()));

    let mut zones = Vec::with_capacity(config.zones.len());
    let mut tails = Vec::with_capacity(config.zones.len());
    let mut aggregators = Vec::with_capacity(config.zones.len());

    for zone in &config.zones {
        let Some(writer) = registry.claim_writer(&zone.name) else {
            // Only reachable with duplicate zone names, which validation removes.
            abort_all(tails.into_iter().chain(aggregators));
            return Err(StartupError::ZoneWriterTaken {
                zone: zone.name.clone(),
            });
        };

        let (handle, rx) = zone_channel(&zone.name);

        aggregators.push(Unit::new(
            UnitKind::Aggregator,
            &zone.name,
            tokio::spawn(ZoneAggregator::new(writer, rx).run()),
        ));

        let supervisor = TailSupervisor::new(
            &zone.name,
            &zone.log_path,
            config.follow.clone(),
            config.retry_backoff,
            handle.sender(),
            shutdown.signal(),
        );
        tails.push(Unit::new(
            UnitKind::Tail,
            &zone.name,
            tokio::spawn(supervisor.run()),
        ));

        zones.push(handle);
    }

    let handler = Arc::new(StatsHandler::new(registry.clone(), zones.clone()));
    let server_shutdown = shutdown.signal();
    let stats_server = Unit::new(
        UnitKind::StatsServer,
        local_addr.to_string(),
        tokio::spawn(async move {
            if let Err(e) = serve(listener, handler, server_shutdown).await {
                tracing::error!(error = %e, "stats server failed");
            }
        }),
    );

    tracing::info!(
        listen = %local_addr,
        zones = ?registry.names().collect::<Vec<_>>(),
        "zonestat started"
    );

    Ok(Service {
        local_addr,
        registry,
        zones,
        shutdown,
        shutdown_timeout: config.shutdown_timeout,
        tails,
        aggregators,
        stats_server,
    })
}

impl Service {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Orderly teardown:
    ///
    /// 1. broadcast shutdown (tails stop and reap, stats server stops accepting)
    /// 2. join tails
    /// 3. tell each aggregator to stop, join aggregators
    /// 4. join the stats server
    ///
    /// Each phase gets `shutdown_timeout`; units still running after that are
    /// aborted and reported.
    pub async fn stop(self) -> ShutdownReport {
        self.shutdown.trigger();
        let timeout = self.shutdown_timeout;
        let mut report = ShutdownReport::default();

        report.merge(join_units(self.tails, Instant::now() + timeout).await);

        let deadline = Instant::now() + timeout;
        for zone in &self.zones {
            match tokio::time::timeout_at(deadline, zone.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "aggregator already stopped"),
                Err(_) => tracing::warn!(zone = zone.name(), "timed out signalling aggregator"),
            }
        }
        report.merge(join_units(self.aggregators, deadline).await);

        report.merge(join_units(vec![self.stats_server], Instant::now() + timeout).await);

        if report.is_clean() {
            tracing::info!(units = report.stopped.len(), "zonestat stopped");
        } else {
            tracing::warn!(
                timed_out = ?report.timed_out,
                panicked = ?report.panicked,
                "some units failed to stop promptly"
            );
        }

        report
    }
}

fn abort_all(units: impl Iterator<Item = Unit>) {
    for unit in units {
        unit.handle.abort();
    }
}
