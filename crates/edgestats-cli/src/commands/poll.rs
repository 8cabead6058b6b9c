//! `edgestats poll`: a bounded synchronous run, handy for checking a host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use edgestats_core::{EdgeStatsError, Result, UpdateOutcome, wait_until};

use super::AgentArgs;

pub fn run(args: &AgentArgs, count: usize) -> Result<()> {
    let config = args.resolve()?;
    let aggregator = super::make_aggregator(&config);
    let interval = Duration::from_secs_f64(config.poll_interval_secs);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            warn!("cannot install Ctrl-C handler: {e}");
        }
    }

    for i in 0..count {
        let report = aggregator.update();
        match report.outcome {
            UpdateOutcome::ProviderFailed => warn!("poll {}/{count}: counter query failed", i + 1),
            outcome => info!("poll {}/{count}: {outcome:?}, {} buffered", i + 1, report.buffered),
        }
        if i + 1 == count {
            break;
        }
        // Sleep out the interval, waking early on Ctrl-C.
        if wait_until(
            || stop.load(Ordering::SeqCst),
            interval,
            Duration::from_millis(100),
        ) {
            info!("interrupted, draining early");
            break;
        }
    }

    let window = aggregator.drain();
    let json = serde_json::to_string_pretty(&window).map_err(EdgeStatsError::Encode)?;
    println!("{json}");
    Ok(())
}
