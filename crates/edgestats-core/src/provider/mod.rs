//! Collaborator contracts consumed by the aggregator.
//!
//! The aggregator never talks to the dataplane itself. Everything it knows
//! about counters, process identity, tunnels and router state comes through
//! these traits. Calls are synchronous; implementations are responsible for
//! bounding their own latency.

pub mod procfs;

use std::fmt;
use std::path::PathBuf;

use log::warn;
use serde_json::Value;

use crate::counters::InterfaceTable;
use crate::record::empty_blob;

/// Source of raw cumulative interface counters.
pub trait CounterProvider: Send + Sync {
    /// Current counters, or `None` when the dataplane could not be queried.
    fn snapshot(&self) -> Option<InterfaceTable>;
}

/// Identity and liveness of the dataplane process.
pub trait ProcessMonitor: Send + Sync {
    /// Opaque identity token; empty when the process is not running.
    fn identity(&self) -> ProcessIdentity;

    /// Whether the dataplane is currently up.
    fn is_live(&self) -> bool;
}

/// Overlay tunnel statistics, passed through unmodified.
pub trait TunnelStatsProvider: Send + Sync {
    fn tunnel_stats(&self) -> Value;
}

/// Router-level state as seen by the surrounding agent.
pub trait RouterStatusProvider: Send + Sync {
    /// `(state, reason)`, e.g. `("running", "")`.
    fn router_state(&self) -> (String, String);

    /// Whether a load simulator stands in for the real dataplane.
    fn simulated_load_enabled(&self) -> bool;
}

/// Opaque identity of one dataplane process instance.
///
/// Any change of token, including to or from the empty token, marks a
/// restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProcessIdentity(String);

impl ProcessIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The "not running" identity.
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn is_running(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProcessIdentity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ProcessIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<not running>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Fixed router state, for agents without a lifecycle controller.
#[derive(Debug, Clone)]
pub struct StaticRouterState {
    pub state: String,
    pub reason: String,
    pub simulated_load: bool,
}

impl Default for StaticRouterState {
    fn default() -> Self {
        Self {
            state: "running".to_string(),
            reason: String::new(),
            simulated_load: false,
        }
    }
}

impl RouterStatusProvider for StaticRouterState {
    fn router_state(&self) -> (String, String) {
        (self.state.clone(), self.reason.clone())
    }

    fn simulated_load_enabled(&self) -> bool {
        self.simulated_load
    }
}

/// Reports no tunnels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTunnelStats;

impl TunnelStatsProvider for NoTunnelStats {
    fn tunnel_stats(&self) -> Value {
        empty_blob()
    }
}

/// Reads a JSON tunnel stats blob written by an external collector.
#[derive(Debug, Clone)]
pub struct FileTunnelStats {
    path: PathBuf,
}

impl FileTunnelStats {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TunnelStatsProvider for FileTunnelStats {
    fn tunnel_stats(&self) -> Value {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("tunnel stats unavailable ({}): {e}", self.path.display());
                return empty_blob();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("tunnel stats in {} are not valid JSON: {e}", self.path.display());
            empty_blob()
        })
    }
}
