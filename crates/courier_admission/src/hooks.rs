//! Observer hooks for limiter admission events.

use crate::LimiterStats;
use std::time::Duration;

/// Per-call observer for the three admission outcomes.
///
/// All methods default to no-ops; implement the ones you want telemetry
/// from. The limiter invokes these synchronously at the decision point, so
/// implementations should be cheap and must not block.
pub trait AdmissionHooks: Send + Sync {
    /// The call found no free slot and was placed in the wait queue.
    fn on_queue(&self, stats: &LimiterStats) {
        let _ = stats;
    }

    /// The call was granted a slot, either immediately (`queue_wait` is
    /// zero) or after waiting in the queue.
    fn on_acquire(&self, stats: &LimiterStats, queue_wait: Duration) {
        let _ = (stats, queue_wait);
    }

    /// The wait queue was full and the call was rejected.
    fn on_drop(&self, stats: &LimiterStats) {
        let _ = stats;
    }
}

/// Hook-less acquisition.
impl AdmissionHooks for () {}
