//! Agent configuration, loaded from JSON with every field defaulted.
//!
//! ```json
//! {
//!   "aggregator": { "history_capacity": 120, "negative_deltas": "clamp" },
//!   "poll_interval_secs": 30,
//!   "dataplane_process": "vpp_main",
//!   "interfaces": { "names": ["eth0", "eth1"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregator::Collaborators;
use crate::buffer::DEFAULT_HISTORY_CAPACITY;
use crate::delta::NegativeDeltaPolicy;
use crate::error::{EdgeStatsError, Result};
use crate::provider::procfs::{InterfaceFilter, ProcNetDevCounters, ProcessByName};
use crate::provider::{FileTunnelStats, NoTunnelStats, StaticRouterState, TunnelStatsProvider};

/// Settings owned by the aggregator itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub history_capacity: usize,
    pub negative_deltas: NegativeDeltaPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            negative_deltas: NegativeDeltaPolicy::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(EdgeStatsError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full agent configuration: aggregator, poller, reference collaborators
/// and the HTTP listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub aggregator: AggregatorConfig,
    pub poll_interval_secs: f64,
    /// Command name of the dataplane process, matched against `/proc/<pid>/comm`.
    pub dataplane_process: String,
    pub proc_root: PathBuf,
    pub interfaces: InterfaceFilter,
    /// JSON blob refreshed by an external tunnel collector.
    pub tunnel_stats_file: Option<PathBuf>,
    pub router_state: String,
    pub router_state_reason: String,
    pub simulated_load: bool,
    pub host: String,
    pub port: u16,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            poll_interval_secs: 30.0,
            dataplane_process: "vpp_main".to_string(),
            proc_root: PathBuf::from("/proc"),
            interfaces: InterfaceFilter::default(),
            tunnel_stats_file: None,
            router_state: "running".to_string(),
            router_state_reason: String::new(),
            simulated_load: false,
            host: "127.0.0.1".to_string(),
            port: 9480,
        }
    }
}

impl AgentConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| EdgeStatsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| EdgeStatsError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.aggregator.validate()?;
        if !(self.poll_interval_secs.is_finite() && self.poll_interval_secs > 0.0) {
            return Err(EdgeStatsError::InvalidConfig(format!(
                "poll_interval_secs must be positive, got {}",
                self.poll_interval_secs
            )));
        }
        if self.dataplane_process.trim().is_empty() {
            return Err(EdgeStatsError::InvalidConfig(
                "dataplane_process must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Procfs-backed collaborators described by this config.
    pub fn collaborators(&self) -> Collaborators {
        let tunnels: Box<dyn TunnelStatsProvider> = match &self.tunnel_stats_file {
            Some(path) => Box::new(FileTunnelStats::new(path)),
            None => Box::new(NoTunnelStats),
        };
        Collaborators {
            counters: Box::new(ProcNetDevCounters::new(&self.proc_root, self.interfaces.clone())),
            monitor: Box::new(ProcessByName::new(&self.proc_root, &self.dataplane_process)),
            tunnels,
            router: Box::new(StaticRouterState {
                state: self.router_state.clone(),
                reason: self.router_state_reason.clone(),
                simulated_load: self.simulated_load,
            }),
        }
    }
}
