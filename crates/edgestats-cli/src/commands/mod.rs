pub mod config;
pub mod poll;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use log::info;

use edgestats_core::provider::procfs::ProcessByName;
use edgestats_core::{AgentConfig, NegativeDeltaPolicy, Result, StatsAggregator};

/// Options shared by every command. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct AgentArgs {
    /// JSON config file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Poll interval in seconds
    #[arg(long)]
    pub interval: Option<f64>,

    /// Dataplane process command name
    #[arg(long)]
    pub process: Option<String>,

    /// procfs root (e.g. /host/proc inside a container)
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Comma-separated interface names to report (default: all but loopback)
    #[arg(long)]
    pub interfaces: Option<String>,

    /// Handling of counters that decrease: surface or clamp
    #[arg(long)]
    pub negative_deltas: Option<NegativeDeltaPolicy>,

    /// History capacity in records
    #[arg(long)]
    pub history: Option<usize>,

    /// JSON file with tunnel statistics to pass through
    #[arg(long)]
    pub tunnel_stats: Option<PathBuf>,

    /// Report a simulated dataplane as always running
    #[arg(long)]
    pub simulated_load: bool,
}

impl AgentArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve(&self) -> Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::load(path)?,
            None => AgentConfig::default(),
        };
        if let Some(secs) = self.interval {
            config.poll_interval_secs = secs;
        }
        if let Some(ref name) = self.process {
            config.dataplane_process = name.clone();
        }
        if let Some(ref root) = self.proc_root {
            config.proc_root = root.clone();
        }
        if let Some(ref list) = self.interfaces {
            config.interfaces.names = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(policy) = self.negative_deltas {
            config.aggregator.negative_deltas = policy;
        }
        if let Some(n) = self.history {
            config.aggregator.history_capacity = n;
        }
        if let Some(ref path) = self.tunnel_stats {
            config.tunnel_stats_file = Some(path.clone());
        }
        if self.simulated_load {
            config.simulated_load = true;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Build the aggregator with procfs-backed collaborators.
pub fn make_aggregator(config: &AgentConfig) -> Arc<StatsAggregator> {
    info!(
        "tracking dataplane '{}' under {}, history {} records, negative deltas: {}",
        config.dataplane_process,
        config.proc_root.display(),
        config.aggregator.history_capacity,
        config.aggregator.negative_deltas
    );
    Arc::new(StatsAggregator::new(
        config.aggregator.clone(),
        config.collaborators(),
    ))
}

/// Monitor for the configured dataplane, independent of the aggregator.
pub fn dataplane_monitor(config: &AgentConfig) -> ProcessByName {
    ProcessByName::new(&config.proc_root, &config.dataplane_process)
}
