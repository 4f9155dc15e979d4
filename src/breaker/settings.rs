//! Breaker settings.

use std::time::Duration;

/// Cooldown used when `timeout` is zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Trip threshold used when `threshold` is zero.
pub const DEFAULT_THRESHOLD: u32 = 1;
/// Half-open probe budget used when `max_requests` is zero.
pub const DEFAULT_MAX_REQUESTS: u32 = 1;

/// Settings for a new [`CircuitBreaker`](super::CircuitBreaker).
///
/// Zero values select the defaults, so `Settings::default()` is a usable
/// configuration: threshold 1, one probe, one second cooldown and no periodic
/// reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Period after which the total counters are cleared while closed.
    /// Zero disables the periodic reset.
    pub interval: Duration,
    /// Time spent open before the breaker moves to half-open.
    pub timeout: Duration,
    /// The breaker opens once consecutive failures exceed this value.
    pub threshold: u32,
    /// Probes admitted while half-open, and the consecutive successes needed
    /// to close again.
    pub max_requests: u32,
}

impl Settings {
    /// Replace zero values with the defaults.
    ///
    /// Never fails: a breaker can always be built from whatever the caller
    /// passed in.
    pub fn validated(mut self) -> Self {
        if self.threshold == 0 {
            self.threshold = DEFAULT_THRESHOLD;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.max_requests == 0 {
            self.max_requests = DEFAULT_MAX_REQUESTS;
        }
        self
    }

    /// Whether the periodic counter reset runs.
    pub fn reset_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}
