//! # edgestats-core
//!
//! Turns cumulative per-interface dataplane counters into a bounded history
//! of per-poll deltas for a management-plane consumer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use edgestats_core::{AgentConfig, StatsAggregator};
//!
//! let config = AgentConfig::default();
//! let aggregator = StatsAggregator::new(config.aggregator.clone(), config.collaborators());
//!
//! // Once per poll tick...
//! aggregator.update();
//!
//! // ...and whenever the consumer pulls.
//! let window = aggregator.drain();
//! println!("{}", serde_json::to_string(&window).unwrap());
//! ```
//!
//! ## Architecture
//!
//! Counter provider → delta calculator → stats store → update buffer → drain
//!
//! - The store resets whenever the dataplane process identity changes, so no
//!   delta ever spans a restart.
//! - A failed counter query leaves a gap in history rather than a zeroed record.
//! - The first successful poll after a reset or failure is a baseline and
//!   carries no deltas.
//! - Drain returns the whole buffer and empties it; only the newest record is
//!   annotated with live router status.
//!
//! Collaborators are injected through the traits in [`provider`]. Reference
//! implementations backed by procfs live in [`provider::procfs`].

pub mod aggregator;
pub mod buffer;
pub mod clock;
pub mod config;
pub mod counters;
pub mod delta;
pub mod error;
pub mod poll;
pub mod provider;
pub mod record;
pub mod status;
pub mod store;

pub use aggregator::{Collaborators, StatsAggregator, StoreView, UpdateOutcome, UpdateReport};
pub use buffer::{DEFAULT_HISTORY_CAPACITY, UpdateBuffer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AgentConfig, AggregatorConfig};
pub use counters::{InterfaceCounters, InterfaceTable, Snapshot};
pub use delta::{DeltaMap, InterfaceDelta, NegativeDeltaPolicy, compute_deltas};
pub use error::{EdgeStatsError, Result};
pub use poll::wait_until;
pub use provider::{
    CounterProvider, FileTunnelStats, NoTunnelStats, ProcessIdentity, ProcessMonitor,
    RouterStatusProvider, StaticRouterState, TunnelStatsProvider,
};
pub use record::{DeltaRecord, DrainResponse, LiveStatus};
pub use status::resolve_status;
pub use store::{IdentityChange, IdentityTracker, StatsStore};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
