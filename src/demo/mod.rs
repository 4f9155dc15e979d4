//! Demo consumer.
//!
//! # Data Flow
//! ```text
//! runner.rs (N workers)
//!     → client.rs: breaker.allow()?
//!         no  → GuardError::Rejected, nothing sent
//!         yes → GET backend.rs (flaky axum server)
//!             → register_ok() / register_error()
//! ```
//!
//! The breaker never sees the HTTP layer; the client is the only code that
//! translates responses into outcomes.

pub mod backend;
pub mod client;
pub mod runner;

pub use backend::{BackendStats, FlakyBackend};
pub use client::{GuardError, GuardedClient};
pub use runner::{run_load, LoadReport};
