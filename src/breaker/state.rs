//! Breaker state.

use std::fmt;

use serde::Serialize;

/// State of a [`CircuitBreaker`](super::CircuitBreaker).
///
/// The discriminants are what the `circuit_breaker_state` gauge reports.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Tripped: every request is rejected until the cooldown elapses.
    Open = 0,
    /// Normal operation: every request is admitted.
    #[default]
    Closed = 1,
    /// Probing: at most `max_requests` requests are admitted.
    HalfOpen = 2,
}

impl State {
    /// Lowercase label used in log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            State::Open => "open",
            State::Closed => "closed",
            State::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_closed() {
        assert_eq!(State::default(), State::Closed);
    }

    #[test]
    fn test_gauge_encoding() {
        assert_eq!(State::Open as u8, 0);
        assert_eq!(State::Closed as u8, 1);
        assert_eq!(State::HalfOpen as u8, 2);
    }

    #[test]
    fn test_labels() {
        assert_eq!(State::HalfOpen.to_string(), "half_open");
        assert_eq!(serde_json::to_string(&State::Open).unwrap(), "\"open\"");
    }
}
