//! Live router status, resolved independently of poll history.

use crate::provider::{ProcessMonitor, RouterStatusProvider};
use crate::record::LiveStatus;

/// Current running/state/reason.
///
/// Load simulation bypasses the real liveness and router-state checks.
pub fn resolve_status(
    router: &dyn RouterStatusProvider,
    monitor: &dyn ProcessMonitor,
) -> LiveStatus {
    if router.simulated_load_enabled() {
        return LiveStatus::simulated();
    }
    let running = monitor.is_live();
    let (state, reason) = router.router_state();
    LiveStatus {
        running,
        state,
        reason,
    }
}
