//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed task leaves its loop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//! ```
//!
//! # Design Decisions
//! - Background work never outlives its owner: breakers stop their timers on
//!   drop, the demo stops its backend and workers on signal
//! - One broadcast channel per owner, no global state

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
