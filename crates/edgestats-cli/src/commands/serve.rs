//! `edgestats serve`: periodic poller plus the HTTP pull endpoint, sharing
//! one aggregator.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::MissedTickBehavior;

use edgestats_core::provider::ProcessMonitor;
use edgestats_core::{EdgeStatsError, Result, StatsAggregator, UpdateOutcome, wait_until};

use super::AgentArgs;

pub fn run(
    args: &AgentArgs,
    host: Option<String>,
    port: Option<u16>,
    wait_dataplane: Option<f64>,
) -> Result<()> {
    let mut config = args.resolve()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    if let Some(secs) = wait_dataplane {
        let monitor = super::dataplane_monitor(&config);
        let up = wait_until(
            || monitor.is_live(),
            Duration::from_secs_f64(secs.max(0.0)),
            Duration::from_millis(500),
        );
        if up {
            info!("dataplane up: {}", monitor.identity());
        } else {
            warn!(
                "dataplane '{}' not running after {secs}s, polling anyway",
                config.dataplane_process
            );
        }
    }

    let aggregator = super::make_aggregator(&config);
    let interval = Duration::from_secs_f64(config.poll_interval_secs);

    println!("edgestats v{}", edgestats_core::VERSION);
    println!("   http://{}:{}", config.host, config.port);
    println!("   polling every {:.1}s", config.poll_interval_secs);
    println!();
    println!("   Endpoints:");
    println!("     GET  /api/v1/stats     Drain buffered interface deltas");
    println!("     GET  /health           Store state (does not drain)");
    println!("     POST /api/v1/running   Override running flag");
    println!("     POST /api/v1/reset     Discard stats and history");
    println!();

    let rt = tokio::runtime::Runtime::new().map_err(EdgeStatsError::Serve)?;
    rt.block_on(async move {
        let poller = tokio::spawn(poll_loop(Arc::clone(&aggregator), interval));
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("cannot listen for Ctrl-C: {e}");
            }
            info!("shutting down");
        };
        let served =
            edgestats_server::run_server(aggregator, &config.host, config.port, shutdown).await;
        poller.abort();
        served
    })
}

async fn poll_loop(aggregator: Arc<StatsAggregator>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let agg = Arc::clone(&aggregator);
        match tokio::task::spawn_blocking(move || agg.update()).await {
            Ok(report) => match report.outcome {
                UpdateOutcome::ProviderFailed => {
                    warn!("counter query failed, history not extended")
                }
                outcome => debug!("{outcome:?}, {} buffered", report.buffered),
            },
            Err(e) => error!("poll task panicked: {e}"),
        }
    }
}
