//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Breaker settings are not
//! checked here: zero values are legal and mean "use the default".
//!
//! All errors are collected, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DemoConfig;

/// A single semantic problem in a [`DemoConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("backend.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("backend.failure_probability {0} is outside [0, 1]")]
    FailureProbabilityOutOfRange(f64),

    #[error("load.workers must be at least 1")]
    NoWorkers,

    #[error("load.request_timeout_ms must be at least 1")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check `config`, returning every problem found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.backend.bind_address.clone(),
        ));
    }

    let p = config.backend.failure_probability;
    if !(0.0..=1.0).contains(&p) {
        errors.push(ValidationError::FailureProbabilityOutOfRange(p));
    }

    if config.load.workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }

    if config.load.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
