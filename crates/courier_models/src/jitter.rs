//! Default backoff jitter source.

use courier_interface::JitterSource;
use rand::Rng;

/// Jitter drawn uniformly from [0.8, 1.2] via the thread-local RNG.
///
/// Spreading backoff delays keeps many concurrent callers that hit the same
/// transient failure from retrying in lockstep.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformJitter;

impl JitterSource for UniformJitter {
    fn factor(&self) -> f64 {
        rand::thread_rng().gen_range(0.8..=1.2)
    }
}
