use crate::zone::counters::ResponseCounters;
use crate::zone::parse::ResponseStatus;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Counters of one zone plus its single-writer claim.
#[derive(Debug)]
pub struct ZoneState {
    name: String,
    counters: RwLock<ResponseCounters>,
    writer_claimed: AtomicBool,
}

impl ZoneState {
    fn new(name: String) -> Self {
        Self {
            name,
            counters: RwLock::new(ResponseCounters::new()),
            writer_claimed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consistent copy of the counters.
    pub fn snapshot(&self) -> ResponseCounters {
        self.read().clone()
    }

    // Every update is applied in full while the lock is held, so a poisoned
    // lock still guards consistent counters.
    fn read(&self) -> RwLockReadGuard<'_, ResponseCounters> {
        self.counters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ResponseCounters> {
        self.counters.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive write access to one zone's counters.
///
/// Invariants:
/// - At most one writer exists per zone at any time
/// - The claim is released on Drop
#[derive(Debug)]
pub struct ZoneWriter {
    state: Arc<ZoneState>,
}

impl ZoneWriter {
    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn record(&self, status: ResponseStatus) {
        self.state.write().record(status);
    }

    pub fn reset(&self) {
        self.state.write().reset();
    }

    pub fn snapshot(&self) -> ResponseCounters {
        self.state.snapshot()
    }
}

impl Drop for ZoneWriter {
    fn drop(&mut self) {
        self.state.writer_claimed.store(false, Ordering::Release);
    }
}

/// Fixed set of zones, keyed and iterated by name in sorted order.
///
/// The map itself never changes after construction; only the counters inside
/// each zone do.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Arc<BTreeMap<String, Arc<ZoneState>>>,
}

impl ZoneRegistry {
    /// Build a registry with zero-valued counters. Repeated names collapse into one zone.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let zones = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| (name.clone(), Arc::new(ZoneState::new(name))))
            .collect();

        Self {
            zones: Arc::new(zones),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn zone(&self, name: &str) -> Option<Arc<ZoneState>> {
        self.zones.get(name).cloned()
    }

    /// Claim the writer for `name`. Returns `None` for unknown zones or when
    /// another writer is still alive.
    pub fn claim_writer(&self, name: &str) -> Option<ZoneWriter> {
        let state = self.zones.get(name)?;

        state
            .writer_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        Some(ZoneWriter {
            state: state.clone(),
        })
    }

    /// Per-zone consistent snapshot of every zone, sorted by name.
    ///
    /// Zones are locked one at a time; there is no registry-wide lock.
    pub fn snapshot(&self) -> BTreeMap<String, ResponseCounters> {
        self.zones
            .iter()
            .map(|(name, state)| (name.clone(), state.snapshot()))
            .collect()
    }
}
