//! Per-interface deltas between two consecutive snapshots.
//!
//! Deltas are only produced for interfaces present in both snapshots. An
//! interface seen for the first time is absent from the result rather than
//! reported against a zero baseline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::counters::{InterfaceCounters, Snapshot};

/// Counter differences for one interface over one poll period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceDelta {
    pub rx_bytes: f64,
    pub rx_pkts: f64,
    pub tx_bytes: f64,
    pub tx_pkts: f64,
}

/// Interface name to delta, ordered by name.
pub type DeltaMap = BTreeMap<String, InterfaceDelta>;

impl InterfaceDelta {
    /// Component-wise `curr - prev`.
    pub fn between(prev: &InterfaceCounters, curr: &InterfaceCounters) -> Self {
        Self {
            rx_bytes: diff(prev.rx_bytes, curr.rx_bytes),
            rx_pkts: diff(prev.rx_pkts, curr.rx_pkts),
            tx_bytes: diff(prev.tx_bytes, curr.tx_bytes),
            tx_pkts: diff(prev.tx_pkts, curr.tx_pkts),
        }
    }

    /// True if any counter went backwards.
    pub fn has_negative(&self) -> bool {
        self.rx_bytes < 0.0 || self.rx_pkts < 0.0 || self.tx_bytes < 0.0 || self.tx_pkts < 0.0
    }

    pub fn clamped(self) -> Self {
        Self {
            rx_bytes: self.rx_bytes.max(0.0),
            rx_pkts: self.rx_pkts.max(0.0),
            tx_bytes: self.tx_bytes.max(0.0),
            tx_pkts: self.tx_pkts.max(0.0),
        }
    }
}

// Widen before subtracting so values above 2^53 keep their low bits.
fn diff(prev: u64, curr: u64) -> f64 {
    (i128::from(curr) - i128::from(prev)) as f64
}

/// What to do with a counter that decreased without a process restart.
///
/// Wraparound is never unwrapped: a decrease is either reported as-is or
/// flattened to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDeltaPolicy {
    /// Pass negative deltas through and let the consumer decide.
    #[default]
    Surface,
    /// Clamp each negative component to zero.
    Clamp,
}

impl fmt::Display for NegativeDeltaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface => write!(f, "surface"),
            Self::Clamp => write!(f, "clamp"),
        }
    }
}

impl FromStr for NegativeDeltaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(Self::Surface),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!(
                "unknown negative delta policy '{other}' (expected surface or clamp)"
            )),
        }
    }
}

/// Compute deltas for every interface in `curr` that also appears in `prev`.
///
/// `prev` must be the snapshot retained from the previous successful poll of
/// the same process instance; the operation is not symmetric.
pub fn compute_deltas(prev: &Snapshot, curr: &Snapshot, policy: NegativeDeltaPolicy) -> DeltaMap {
    let mut out = DeltaMap::new();
    for (iface, counters) in &curr.interfaces {
        let Some(prev_counters) = prev.get(iface) else {
            continue;
        };
        let mut delta = InterfaceDelta::between(prev_counters, counters);
        if delta.has_negative() {
            warn!("interface {iface}: counters decreased without a dataplane restart ({policy})");
            if policy == NegativeDeltaPolicy::Clamp {
                delta = delta.clamped();
            }
        }
        out.insert(iface.clone(), delta);
    }
    out
}
