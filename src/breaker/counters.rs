//! Request outcome counters.
//!
//! # Continuous vs. total
//! - Continuous counters describe the current streak. A success zeroes
//!   `failure_continuous` and a failure zeroes `success_continuous`, so at most
//!   one of the two is nonzero. `requests_continuous` restarts on every state
//!   transition.
//! - Total counters only grow. The periodic reset clears them while the
//!   breaker is closed.

use serde::Serialize;

/// Point-in-time copy of a breaker's counters.
///
/// Returned by [`CircuitBreaker::counters`](super::CircuitBreaker::counters);
/// it is not a live view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Outcomes reported since the last state transition.
    pub requests_continuous: u64,
    /// Consecutive successes.
    pub success_continuous: u64,
    /// Consecutive failures.
    pub failure_continuous: u64,

    /// Outcomes reported since the last periodic reset.
    pub requests_total: u64,
    /// Successes reported since the last periodic reset.
    pub success_total: u64,
    /// Failures reported since the last periodic reset.
    pub failure_total: u64,
    /// Requests rejected by `allow()` since the last periodic reset.
    pub throttled_total: u64,
}

impl Counters {
    pub(crate) fn on_success(&mut self) {
        self.requests_total += 1;
        self.requests_continuous += 1;
        self.success_total += 1;
        self.success_continuous += 1;
        self.failure_continuous = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.requests_total += 1;
        self.requests_continuous += 1;
        self.failure_total += 1;
        self.failure_continuous += 1;
        self.success_continuous = 0;
    }

    pub(crate) fn on_throttled(&mut self) {
        self.throttled_total += 1;
    }

    /// Periodic reset. Continuous counters are left alone.
    pub(crate) fn clear_totals(&mut self) {
        self.requests_total = 0;
        self.success_total = 0;
        self.failure_total = 0;
        self.throttled_total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaks_reset_each_other() {
        let mut c = Counters::default();
        c.on_failure();
        c.on_failure();
        assert_eq!(c.failure_continuous, 2);
        assert_eq!(c.success_continuous, 0);

        c.on_success();
        assert_eq!(c.failure_continuous, 0);
        assert_eq!(c.success_continuous, 1);

        c.on_failure();
        assert_eq!(c.success_continuous, 0);
        assert_eq!(c.failure_continuous, 1);
    }

    #[test]
    fn test_totals_accumulate() {
        let mut c = Counters::default();
        c.on_success();
        c.on_failure();
        c.on_success();
        c.on_throttled();

        assert_eq!(c.requests_total, 3);
        assert_eq!(c.requests_continuous, 3);
        assert_eq!(c.success_total, 2);
        assert_eq!(c.failure_total, 1);
        assert_eq!(c.throttled_total, 1);
    }

    #[test]
    fn test_clear_totals_keeps_streaks() {
        let mut c = Counters::default();
        c.on_failure();
        c.on_failure();
        c.on_throttled();
        c.clear_totals();

        assert_eq!(c.requests_total, 0);
        assert_eq!(c.failure_total, 0);
        assert_eq!(c.success_total, 0);
        assert_eq!(c.throttled_total, 0);
        assert_eq!(c.requests_continuous, 2);
        assert_eq!(c.failure_continuous, 2);
    }
}
