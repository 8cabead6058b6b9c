//! Raw cumulative interface counters as reported by the dataplane.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cumulative packet/byte counters for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub rx_bytes: u64,
    pub rx_pkts: u64,
    pub tx_bytes: u64,
    pub tx_pkts: u64,
}

impl InterfaceCounters {
    pub fn new(rx_bytes: u64, rx_pkts: u64, tx_bytes: u64, tx_pkts: u64) -> Self {
        Self {
            rx_bytes,
            rx_pkts,
            tx_bytes,
            tx_pkts,
        }
    }
}

/// Interface name to counters, ordered by name.
pub type InterfaceTable = BTreeMap<String, InterfaceCounters>;

/// One point-in-time capture of every interface's counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub interfaces: InterfaceTable,
    /// Capture time, seconds since the Unix epoch.
    pub captured_at: f64,
}

impl Snapshot {
    pub fn new(interfaces: InterfaceTable, captured_at: f64) -> Self {
        Self {
            interfaces,
            captured_at,
        }
    }

    pub fn get(&self, iface: &str) -> Option<&InterfaceCounters> {
        self.interfaces.get(iface)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
