//! Configuration schema definitions.
//!
//! Every section derives Serde traits and falls back to its `Default`, so an
//! empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breaker::Settings;

/// Root configuration for the demo binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Breaker guarding the demo client.
    pub breaker: BreakerConfig,

    /// Flaky backend the client talks to.
    pub backend: BackendConfig,

    /// Load generated against the backend.
    pub load: LoadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Breaker settings as written in the config file.
///
/// Zero values select the breaker defaults, exactly like [`Settings`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerConfig {
    /// Name used in logs and metric labels.
    pub name: String,

    /// Period of the total-counter reset while closed (0 = disabled).
    pub interval_ms: u64,

    /// Time spent open before probing.
    pub timeout_ms: u64,

    /// Consecutive failures tolerated before opening.
    pub threshold: u32,

    /// Probe budget while half-open.
    pub max_requests: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "demo-backend".to_string(),
            interval_ms: 0,
            timeout_ms: 1,
            threshold: 2,
            max_requests: 10,
        }
    }
}

impl From<&BreakerConfig> for Settings {
    fn from(config: &BreakerConfig) -> Self {
        Settings {
            interval: Duration::from_millis(config.interval_ms),
            timeout: Duration::from_millis(config.timeout_ms),
            threshold: config.threshold,
            max_requests: config.max_requests,
        }
    }
}

/// Flaky backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Bind address; port 0 picks a free port.
    pub bind_address: String,

    /// Probability in `[0, 1]` that a request is answered with a 500.
    pub failure_probability: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            failure_probability: 0.05,
        }
    }
}

/// Load generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Concurrent workers.
    pub workers: usize,

    /// Attempts per worker, admitted or not.
    pub requests_per_worker: usize,

    /// Pause before each attempt.
    pub request_delay_ms: u64,

    /// Per-request timeout.
    pub request_timeout_ms: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            requests_per_worker: 1000,
            request_delay_ms: 10,
            request_timeout_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
