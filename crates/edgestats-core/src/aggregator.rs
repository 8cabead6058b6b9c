//! The stats aggregator: one owned object shared by the poller and the
//! request handler.
//!
//! Lifecycle: construct with collaborators → call [`StatsAggregator::update`]
//! once per poll tick and [`StatsAggregator::drain`] on every consumer pull →
//! optionally [`StatsAggregator::reset`].
//!
//! Store, history buffer and tracked identity sit behind one mutex. Update
//! holds it for the whole read-modify-append; drain holds it only for
//! copy-then-clear, after live status has been resolved.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::Serialize;

use crate::buffer::UpdateBuffer;
use crate::clock::{Clock, SystemClock};
use crate::config::AggregatorConfig;
use crate::counters::Snapshot;
use crate::delta::compute_deltas;
use crate::provider::{CounterProvider, ProcessMonitor, RouterStatusProvider, TunnelStatsProvider};
use crate::record::DrainResponse;
use crate::status::resolve_status;
use crate::store::{IdentityChange, IdentityTracker, StatsStore, TrackedRound};

/// External collaborators the aggregator consumes.
pub struct Collaborators {
    pub counters: Box<dyn CounterProvider>,
    pub monitor: Box<dyn ProcessMonitor>,
    pub tunnels: Box<dyn TunnelStatsProvider>,
    pub router: Box<dyn RouterStatusProvider>,
}

/// What a single [`StatsAggregator::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Deltas computed against the previous snapshot and appended.
    Recorded,
    /// First success after a reset or failure; appended with no deltas.
    Baseline,
    /// Provider failed; nothing appended, previous snapshot retained.
    ProviderFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub outcome: UpdateOutcome,
    /// The store was reset because the dataplane identity changed.
    pub reset: bool,
    /// Buffered records after this update.
    pub buffered: usize,
}

/// Read-only view of the store, taken without draining.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreView {
    pub success: bool,
    pub running: bool,
    pub period: f64,
    pub interfaces: usize,
    pub last_capture: Option<f64>,
    pub identity: Option<String>,
    pub buffered: usize,
    pub capacity: usize,
}

struct AggregatorState {
    identity: IdentityTracker,
    store: StatsStore,
    buffer: UpdateBuffer,
}

pub struct StatsAggregator {
    config: AggregatorConfig,
    collaborators: Collaborators,
    clock: Box<dyn Clock>,
    state: Mutex<AggregatorState>,
}

impl StatsAggregator {
    /// # Panics
    /// Panics if `config.history_capacity` is zero; validate configs first.
    pub fn new(config: AggregatorConfig, collaborators: Collaborators) -> Self {
        let buffer = UpdateBuffer::with_capacity(config.history_capacity);
        Self {
            config,
            collaborators,
            clock: Box::new(SystemClock),
            state: Mutex::new(AggregatorState {
                identity: IdentityTracker::default(),
                store: StatsStore::new(),
                buffer,
            }),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    // Every store write happens after the collaborator calls of that step
    // return, so a poisoned lock still guards a consistent state.
    fn lock_state(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll once: crash-reset check, counter query, delta computation, append.
    pub fn update(&self) -> UpdateReport {
        let c = &self.collaborators;
        let mut state = self.lock_state();

        let identity = c.monitor.identity();
        let change = state.identity.observe(&identity);
        let reset = change.requires_reset();
        if reset {
            match &change {
                IdentityChange::Restarted { previous } => {
                    info!("dataplane identity changed {previous} -> {identity}, resetting stats");
                }
                IdentityChange::StillDown => debug!("dataplane still down, resetting stats"),
                _ => info!("tracking dataplane {identity}"),
            }
            state.store.reset();
        }

        let Some(interfaces) = c.counters.snapshot() else {
            warn!("interface counter query failed");
            state.store.mark_failed();
            return UpdateReport {
                outcome: UpdateOutcome::ProviderFailed,
                reset,
                buffered: state.buffer.len(),
            };
        };

        let now = self.clock.now();
        let snapshot = Snapshot::new(interfaces, now);
        let round = if state.store.success() {
            let prev = state.store.last_snapshot();
            Some(TrackedRound {
                deltas: compute_deltas(prev, &snapshot, self.config.negative_deltas),
                tunnel_stats: c.tunnels.tunnel_stats(),
                period: now - prev.captured_at,
                running: c.monitor.is_live(),
            })
        } else {
            None
        };
        let outcome = if round.is_some() {
            UpdateOutcome::Recorded
        } else {
            UpdateOutcome::Baseline
        };

        state.store.commit(snapshot, round);
        let record = state.store.record(now);
        if let Some(evicted) = state.buffer.push(record) {
            debug!("history full, evicted record from {:.3}", evicted.utc);
        }
        debug!(
            "update {outcome:?}: {} interfaces, {} buffered",
            state.store.deltas().len(),
            state.buffer.len()
        );
        UpdateReport {
            outcome,
            reset,
            buffered: state.buffer.len(),
        }
    }

    /// Take every buffered record, annotating the newest one with live status.
    ///
    /// Returns a single placeholder record when nothing was collected since
    /// the previous drain.
    pub fn drain(&self) -> DrainResponse {
        let c = &self.collaborators;
        let status = resolve_status(c.router.as_ref(), c.monitor.as_ref());
        let (records, store_ok) = {
            let mut state = self.lock_state();
            (state.buffer.take_all(), state.store.success())
        };
        debug!("drained {} records", records.len());
        DrainResponse::compose(records, store_ok, &status, self.clock.now())
    }

    /// Override the store's running flag outside the poll cycle.
    pub fn set_running(&self, running: bool) {
        self.lock_state().store.set_running(running);
    }

    /// Discard store, history and tracked identity.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.store.reset();
        state.buffer.clear();
        state.identity.forget();
        info!("stats aggregator reset");
    }

    pub fn store_view(&self) -> StoreView {
        let state = self.lock_state();
        StoreView {
            success: state.store.success(),
            running: state.store.running(),
            period: state.store.period(),
            interfaces: state.store.last_snapshot().len(),
            last_capture: state.store.last_capture(),
            identity: state.identity.current().map(|id| id.as_str().to_string()),
            buffered: state.buffer.len(),
            capacity: state.buffer.capacity(),
        }
    }
}
