use crate::harness::{captured_events, init_test_tracing};
use reqwest::blocking::{Client, RequestBuilder};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use zonestat_core::conf::{RuntimeConfig, ZoneConfig};
use zonestat_core::server::{Service, ShutdownReport, start};
use zonestat_core::zone::{ResponseCounters, ZoneRegistry};

/// Handle to a running zonestat instance with one temp log file per zone.
///
/// The service runs on its own multi-threaded runtime; test code stays
/// synchronous and talks to it over HTTP like any client would.
pub struct TestService {
    runtime: Runtime,
    service: Option<Service>,
    base_url: String,
    client: Client,
    dir: TempDir,
    primes: AtomicUsize,
}

impl TestService {
    /// Start with the default follow command (`tail -n 0 -F`).
    pub fn start(zones: &[&str]) -> Self {
        Self::start_with(zones, |_| {})
    }

    /// Start after letting `patch` adjust the generated config.
    ///
    /// The stats server always binds an ephemeral port, so this is
    /// parallel-safe.
    pub fn start_with(zones: &[&str], patch: impl FnOnce(&mut RuntimeConfig)) -> Self {
        // Initialize tracing (this must happen first).
        init_test_tracing();

        let dir = TempDir::new().expect("failed to create temp dir");

        let zones = zones
            .iter()
            .map(|name| {
                let path = dir.path().join(format!("{name}.access.json"));
                std::fs::write(&path, "").expect("failed to create log file");
                ZoneConfig::new(*name, path)
            })
            .collect();

        let mut cfg = RuntimeConfig::with_zones(zones);
        cfg.server.bind_port = 0;
        cfg.retry_backoff = Duration::from_millis(100);
        patch(&mut cfg);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build runtime");

        let service = runtime
            .block_on(start(cfg))
            .expect("failed to start zonestat");

        let base_url = format!("http://{}", service.local_addr());

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build client");

        Self {
            runtime,
            service: Some(service),
            base_url,
            client,
            dir,
            primes: AtomicUsize::new(0),
        }
    }

    /// Convenience helper for GET requests.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn log_path(&self, zone: &str) -> PathBuf {
        self.dir.path().join(format!("{zone}.access.json"))
    }

    /// Append one line to a zone's log file, as the web server would.
    pub fn append(&self, zone: &str, line: &str) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.log_path(zone))
            .expect("failed to open log file");
        writeln!(file, "{line}").expect("failed to append log line");
        file.flush().unwrap();
    }

    pub fn registry(&self) -> &ZoneRegistry {
        self.service().registry()
    }

    pub fn counters(&self, zone: &str) -> ResponseCounters {
        self.registry()
            .zone(zone)
            .unwrap_or_else(|| panic!("unknown zone {zone}"))
            .snapshot()
    }

    /// Poll the in-process counters (not the API, which would reset them).
    pub fn wait_for(&self, zone: &str, what: &str, done: impl Fn(&ResponseCounters) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if done(&self.counters(zone)) {
                return;
            }
            if Instant::now() > deadline {
                panic!(
                    "zone {zone}: timed out waiting for {what}; counters: {:?}",
                    self.counters(zone)
                );
            }
            thread::sleep(Duration::from_millis(25));
        }
    }

    pub fn wait_for_total(&self, zone: &str, total: u64) {
        self.wait_for(zone, &format!("{total} responses"), |c| c.total() == total);
    }

    /// Block until the follow process for `zone` is emitting appended lines.
    ///
    /// `tail -n 0` ignores anything written before it opens the file, so tests
    /// that append to real log files call this first. The marker lines are not
    /// JSON: the aggregator skips them with a warning, which is what this waits
    /// for, and the zone's counters stay untouched.
    pub fn prime(&self, zone: &str) {
        let marker = format!(
            "zonestat-ready {} #{}",
            self.log_path(zone).display(),
            self.primes.fetch_add(1, Ordering::Relaxed)
        );
        let seen = || skipped_line_count(zone, &marker);

        let deadline = Instant::now() + Duration::from_secs(10);
        while seen() == 0 {
            if Instant::now() > deadline {
                panic!("zone {zone}: follow process never picked up appended lines");
            }
            self.append(zone, &marker);
            thread::sleep(Duration::from_millis(50));
        }

        // Marker lines may still be in flight; wait until they stop arriving.
        // `tail -F` without inotify polls once per second.
        loop {
            let before = seen();
            thread::sleep(Duration::from_millis(1_200));
            if seen() == before {
                break;
            }
        }
    }

    /// Pid written by a follow command that runs `echo $$ > "$0.pid"` first.
    pub fn follow_pid(&self, zone: &str) -> Option<i32> {
        let mut path = self.log_path(zone).into_os_string();
        path.push(".pid");
        std::fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    pub fn stop(mut self) -> ShutdownReport {
        let service = self.service.take().expect("service already stopped");
        self.runtime.block_on(service.stop())
    }

    fn service(&self) -> &Service {
        self.service.as_ref().expect("service already stopped")
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        if let Some(service) = self.service.take() {
            self.runtime.block_on(service.stop());
        }
    }
}

fn skipped_line_count(zone: &str, input: &str) -> usize {
    captured_events()
        .iter()
        .filter(|e| e.message() == Some("skipping log line"))
        .filter(|e| e.field("zone") == Some(zone))
        .filter(|e| e.field("input") == Some(input))
        .count()
}
