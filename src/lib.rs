//! Circuit breaker for unreliable downstream calls.
//!
//! A [`CircuitBreaker`] sits in front of a remote dependency. Callers ask
//! [`CircuitBreaker::allow`] before each call and report the result with
//! [`CircuitBreaker::register_ok`] or [`CircuitBreaker::register_error`].
//! Once consecutive failures exceed the threshold the breaker opens and
//! rejects calls until a cooldown elapses, then lets a few probes through to
//! decide whether to close again.
//!
//! # Layout
//! ```text
//! breaker/        state machine, counters, settings, timers (the core)
//! config/         TOML configuration for the demo binary
//! observability/  logging and metrics
//! lifecycle/      shutdown coordination and signals
//! demo/           flaky backend, guarded HTTP client, load runner
//! ```

pub mod breaker;
pub mod config;
pub mod demo;
pub mod lifecycle;
pub mod observability;

pub use breaker::{CircuitBreaker, Counters, Settings, State};
pub use lifecycle::Shutdown;
