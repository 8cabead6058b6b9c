//! Latest poll state and the crash-reset state machine.
//!
//! States:
//! - **Uninitialized**: no identity observed yet, or just reset.
//! - **Tracking, success**: last poll succeeded; the next success yields deltas.
//! - **Tracking, failed**: last poll failed (or nothing polled since reset);
//!   the next success is a transition round with no deltas.
//!
//! An identity change always goes back through Uninitialized before any
//! delta is computed.

use serde_json::Value;

use crate::counters::Snapshot;
use crate::delta::DeltaMap;
use crate::provider::ProcessIdentity;
use crate::record::{DeltaRecord, empty_blob};

/// What an identity observation did to the tracked process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityChange {
    Unchanged,
    /// First observation since construction or reset.
    FirstSeen,
    Restarted {
        previous: ProcessIdentity,
    },
    /// The dataplane was already down at the previous poll and still is.
    StillDown,
}

impl IdentityChange {
    /// Whether the store must be reset before this poll.
    pub fn requires_reset(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Last observed dataplane identity.
#[derive(Debug, Clone, Default)]
pub struct IdentityTracker {
    current: Option<ProcessIdentity>,
}

impl IdentityTracker {
    /// An empty token counts as absent, so every poll while the dataplane is
    /// down requires a reset.
    pub fn observe(&mut self, identity: &ProcessIdentity) -> IdentityChange {
        match self.current.replace(identity.clone()) {
            None => IdentityChange::FirstSeen,
            Some(previous) if previous != *identity => IdentityChange::Restarted { previous },
            Some(_) if !identity.is_running() => IdentityChange::StillDown,
            Some(_) => IdentityChange::Unchanged,
        }
    }

    pub fn current(&self) -> Option<&ProcessIdentity> {
        self.current.as_ref()
    }

    pub fn forget(&mut self) {
        self.current = None;
    }
}

/// Values produced by a poll whose predecessor also succeeded.
#[derive(Debug, Clone)]
pub struct TrackedRound {
    pub deltas: DeltaMap,
    pub tunnel_stats: Value,
    pub period: f64,
    pub running: bool,
}

/// Latest successful snapshot and the deltas derived from it.
#[derive(Debug, Clone)]
pub struct StatsStore {
    success: bool,
    running: bool,
    last: Snapshot,
    deltas: DeltaMap,
    tunnel_stats: Value,
    period: f64,
    last_capture: Option<f64>,
}

impl Default for StatsStore {
    fn default() -> Self {
        Self {
            success: false,
            running: false,
            last: Snapshot::default(),
            deltas: DeltaMap::new(),
            tunnel_stats: empty_blob(),
            period: 0.0,
            last_capture: None,
        }
    }
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn last_snapshot(&self) -> &Snapshot {
        &self.last
    }

    pub fn deltas(&self) -> &DeltaMap {
        &self.deltas
    }

    pub fn tunnel_stats(&self) -> &Value {
        &self.tunnel_stats
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Capture time of the last committed snapshot, even an empty one.
    pub fn last_capture(&self) -> Option<f64> {
        self.last_capture
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Provider failure: the retained snapshot is kept for the next success.
    pub fn mark_failed(&mut self) {
        self.success = false;
    }

    /// Commit a successful poll. `round` is `None` for a transition round,
    /// which puts deltas, tunnel stats, period and running back to their
    /// reset defaults.
    pub fn commit(&mut self, snapshot: Snapshot, round: Option<TrackedRound>) {
        self.last_capture = Some(snapshot.captured_at);
        self.last = snapshot;
        self.success = true;
        match round {
            Some(round) => {
                self.deltas = round.deltas;
                self.tunnel_stats = round.tunnel_stats;
                self.period = round.period;
                self.running = round.running;
            }
            None => {
                self.deltas.clear();
                self.tunnel_stats = empty_blob();
                self.period = 0.0;
                self.running = false;
            }
        }
    }

    /// History entry for the current state.
    pub fn record(&self, utc: f64) -> DeltaRecord {
        DeltaRecord {
            ok: self.success,
            running: self.running,
            state: None,
            state_reason: None,
            stats: self.deltas.clone(),
            period: self.period,
            tunnel_stats: self.tunnel_stats.clone(),
            utc,
        }
    }
}
