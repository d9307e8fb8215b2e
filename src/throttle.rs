//! Pre-request pacing.
//!
//! A deliberate blocking pause before every request keeps the client under
//! remote rate limits; it is the connection's only intentional suspension
//! point. The window is uniform-random so request spacing does not look
//! mechanical.

use rand::Rng;
use std::time::Duration;

const DEFAULT_MIN_SECS: u64 = 12;
const DEFAULT_MAX_SECS: u64 = 20;

/// Randomized delay window in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_secs: u64,
    max_secs: u64,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            min_secs: DEFAULT_MIN_SECS,
            max_secs: DEFAULT_MAX_SECS,
        }
    }
}

impl Throttle {
    /// A window of `[min_secs, max_secs]`; bounds are swapped if reversed.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    /// Picks the next delay uniformly from the window.
    pub fn delay(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}
