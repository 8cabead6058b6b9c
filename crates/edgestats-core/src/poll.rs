//! Poll a condition until it holds or a deadline passes.

use std::time::{Duration, Instant};

/// Evaluate `condition` every `interval` until it returns true or `timeout`
/// elapses. Returns whether the condition was met.
///
/// The condition is always evaluated at least once, even with a zero timeout.
pub fn wait_until<F>(mut condition: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        std::thread::sleep(interval.min(remaining));
    }
}
