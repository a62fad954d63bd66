//! Jittered waiting between crawl cycles.
//!
//! A fixed polling cadence is easy to fingerprint, so every wait is the base
//! interval plus a uniform random jitter in `[0, jitter)`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Base interval and jitter bound for the wait between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalConfig {
    /// Minimum wait between consecutive cycles.
    pub interval: Duration,

    /// Maximum random jitter added on top of `interval`.
    ///
    /// Set to `Duration::ZERO` to disable.
    pub jitter: Duration,
}

impl IntervalConfig {
    /// Create a new config with the given interval and no jitter.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
        }
    }

    /// Add random jitter (uniform [0, jitter)) on top of the base interval.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Compute the wait before the next cycle (interval + random jitter).
    pub fn next_delay(&self) -> Duration {
        let bound = self.jitter.as_millis() as u64;
        if bound == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(clock_random() % bound)
    }
}

impl Default for IntervalConfig {
    /// 60 seconds between cycles, up to 30 seconds of jitter.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            jitter: Duration::from_secs(30),
        }
    }
}

/// One xorshift64 step over the clock's nanoseconds.
fn clock_random() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos() as u64 ^ d.as_secs().rotate_left(32));
    // zero is a fixed point of xorshift
    let mut x = nanos.max(1);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}
