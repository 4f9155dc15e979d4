//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker operations produce:
//!     → tracing events (state transitions, timer ticks)
//!     → metrics.rs (transition/throttle/outcome counters, state gauge)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Library code never installs a subscriber or recorder
//! - Metrics are labelled by breaker name so several breakers can share a
//!   process

pub mod logging;
pub mod metrics;
