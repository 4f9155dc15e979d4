//! Circuit breaker.
//!
//! # States
//! - Closed: normal operation, every request is admitted
//! - Open: dependency assumed down, requests are rejected until the cooldown
//!   elapses
//! - Half-Open: up to `max_requests` probes test whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed    → Open:      consecutive failures > threshold
//! Half-Open → Open:      any failure
//! Half-Open → Open:      admitted requests not all reported within timeout
//! Half-Open → Closed:    max_requests consecutive successes
//! Open      → Half-Open: cooldown timer fires (timeout)
//! Closed    → Closed:    interval timer fires, total counters cleared
//! ```
//!
//! # Usage
//! ```no_run
//! # async fn call() -> Result<(), ()> { Ok(()) }
//! # async fn run() {
//! use std::time::Duration;
//! use circuit_breaker::{CircuitBreaker, Settings};
//!
//! let breaker = CircuitBreaker::new(Settings {
//!     threshold: 2,
//!     max_requests: 2,
//!     timeout: Duration::from_millis(50),
//!     ..Settings::default()
//! });
//!
//! if breaker.allow() {
//!     match call().await {
//!         Ok(()) => breaker.register_ok(),
//!         Err(()) => breaker.register_error(),
//!     }
//! }
//! # }
//! ```
//!
//! # Design Decisions
//! - State and counters sit behind one mutex: every operation and every
//!   snapshot is consistent, and concurrent transitions cannot interleave
//! - Each transition bumps an epoch; a deadline timer only fires against the
//!   epoch it was started for
//! - The first request admitted while half-open starts a window of
//!   `timeout`. Outcomes that never arrive (a dropped future, a panic) cost a
//!   re-trip, not a breaker stuck half-open
//! - Timers run on the Tokio runtime that was current at construction and
//!   are stopped by [`CircuitBreaker::shutdown`] or on drop. Without a
//!   live runtime the deadline is checked by `allow()` instead and the
//!   periodic reset is unavailable

pub mod counters;
pub mod settings;
pub mod state;
mod timers;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::lifecycle::Shutdown;
use crate::observability::metrics::{self, Outcome};

pub use counters::Counters;
pub use settings::Settings;
pub use state::State;

/// Name used by [`CircuitBreaker::new`].
pub const DEFAULT_NAME: &str = "default";

/// A circuit breaker guarding one downstream dependency.
///
/// Share it between tasks with an `Arc`. All methods take `&self` and only
/// hold an internal lock for a few field updates.
#[derive(Debug)]
pub struct CircuitBreaker {
    shared: Arc<Shared>,
    shutdown: Shutdown,
    reset_task: Option<JoinHandle<()>>,
}

/// State reachable from the timer tasks.
#[derive(Debug)]
pub(crate) struct Shared {
    name: String,
    settings: Settings,
    runtime: Option<Handle>,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: State,
    counters: Counters,
    /// Bumped on every transition.
    epoch: u64,
    /// Requests admitted since entering half-open.
    admitted: u32,
    /// End of the open period, or of the half-open window once a request
    /// was admitted.
    deadline: Option<Instant>,
    /// Task acting on `deadline`. When it is missing or already finished,
    /// `allow()` checks the deadline itself.
    timer: Option<JoinHandle<()>>,
    stopped: bool,
}

impl Inner {
    fn deadline_overdue(&self) -> bool {
        // A task spawned on a runtime that has since shut down is finished
        // without ever having run.
        let timer_pending = self.timer.as_ref().is_some_and(|timer| !timer.is_finished());
        !timer_pending && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl CircuitBreaker {
    /// Create a breaker named [`DEFAULT_NAME`].
    pub fn new(settings: Settings) -> Self {
        Self::named(DEFAULT_NAME, settings)
    }

    /// Create a breaker whose logs and metrics carry `name`.
    ///
    /// Zero settings are replaced by their defaults (see
    /// [`Settings::validated`]). The periodic reset task starts here when an
    /// interval is set.
    pub fn named(name: impl Into<String>, settings: Settings) -> Self {
        let settings = settings.validated();
        let runtime = Handle::try_current().ok();
        let shared = Arc::new(Shared {
            name: name.into(),
            settings,
            runtime,
            inner: Mutex::new(Inner::default()),
        });
        let shutdown = Shutdown::new();

        let reset_task = match (&shared.runtime, settings.reset_enabled()) {
            (Some(runtime), true) => Some(timers::spawn_counter_reset(
                runtime,
                Arc::downgrade(&shared),
                settings.interval,
                shutdown.subscribe(),
            )),
            (None, true) => {
                tracing::warn!(
                    breaker = %shared.name,
                    "No Tokio runtime available, periodic counter reset disabled"
                );
                None
            }
            _ => None,
        };

        tracing::debug!(
            breaker = %shared.name,
            threshold = settings.threshold,
            max_requests = settings.max_requests,
            timeout = ?settings.timeout,
            interval = ?settings.interval,
            "Circuit breaker created"
        );
        metrics::record_state(&shared.name, State::Closed);

        Self {
            shared,
            shutdown,
            reset_task,
        }
    }

    /// Whether the caller may send a request now.
    ///
    /// Always `true` while closed and always `false` while open. While
    /// half-open, each `true` consumes one of the `max_requests` slots, so
    /// callers should follow every admitted request with
    /// [`register_ok`](Self::register_ok) or
    /// [`register_error`](Self::register_error). If they have not all
    /// reported within `timeout` of the first admission, the breaker opens
    /// again. Rejections count towards `throttled_total`.
    pub fn allow(&self) -> bool {
        let mut inner = self.shared.lock();

        if inner.deadline_overdue() {
            let epoch = inner.epoch;
            self.shared.deadline_passed(&mut inner, epoch);
        }

        let admitted = match inner.state {
            State::Closed => true,
            State::HalfOpen if inner.admitted < self.shared.settings.max_requests => {
                inner.admitted += 1;
                if inner.admitted == 1 {
                    self.shared.arm_deadline(&mut inner);
                }
                true
            }
            State::HalfOpen | State::Open => false,
        };

        if !admitted {
            inner.counters.on_throttled();
            drop(inner);
            metrics::record_throttled(&self.shared.name);
        }
        admitted
    }

    /// Report a successful request.
    ///
    /// While half-open, the `max_requests`-th consecutive success closes the
    /// breaker.
    pub fn register_ok(&self) {
        let mut inner = self.shared.lock();
        inner.counters.on_success();

        if inner.state == State::HalfOpen
            && inner.counters.success_continuous >= u64::from(self.shared.settings.max_requests)
        {
            self.shared.transition(&mut inner, State::Closed);
        }
        drop(inner);

        metrics::record_outcome(&self.shared.name, Outcome::Success);
    }

    /// Report a failed request.
    ///
    /// Opens the breaker when half-open, or when closed and consecutive
    /// failures now exceed the threshold.
    pub fn register_error(&self) {
        let mut inner = self.shared.lock();
        inner.counters.on_failure();

        let trip = match inner.state {
            State::HalfOpen => true,
            State::Closed => {
                inner.counters.failure_continuous > u64::from(self.shared.settings.threshold)
            }
            State::Open => false,
        };
        if trip {
            self.shared.trip(&mut inner);
        }
        drop(inner);

        metrics::record_outcome(&self.shared.name, Outcome::Failure);
    }

    /// Snapshot of the counters.
    pub fn counters(&self) -> Counters {
        self.shared.lock().counters
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.shared.lock().state
    }

    /// Settings after defaults were applied.
    pub fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    /// Name used in logs and metric labels.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Stop the background tasks.
    ///
    /// The breaker keeps working afterwards: deadlines are then checked by
    /// `allow()` and the totals are no longer cleared. Idempotent; also run
    /// on drop.
    pub fn shutdown(&self) {
        self.shutdown.trigger();

        let mut inner = self.shared.lock();
        if !inner.stopped {
            tracing::debug!(breaker = %self.shared.name, "Stopping circuit breaker timers");
        }
        inner.stopped = true;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for CircuitBreaker {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(task) = &self.reset_task {
            task.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves `Inner` consistent, so a poisoned
        // lock is still safe to use.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, inner: &mut Inner, to: State) {
        let from = inner.state;
        inner.state = to;
        inner.epoch += 1;
        inner.admitted = 0;
        inner.counters.requests_continuous = 0;
        if to == State::HalfOpen {
            // Late successes reported while open must not count towards
            // closing.
            inner.counters.success_continuous = 0;
        }
        inner.deadline = None;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        tracing::info!(
            breaker = %self.name,
            from = %from,
            to = %to,
            failures = inner.counters.failure_continuous,
            "Circuit breaker state changed"
        );
        metrics::record_transition(&self.name, from, to);
    }

    /// Open the breaker and schedule the move to half-open.
    fn trip(self: &Arc<Self>, inner: &mut Inner) {
        self.transition(inner, State::Open);
        self.arm_deadline(inner);
    }

    /// Set `deadline` one `timeout` from now for the current epoch and start
    /// a task for it when a runtime is available.
    fn arm_deadline(self: &Arc<Self>, inner: &mut Inner) {
        let timeout = self.settings.timeout;
        inner.deadline = Some(Instant::now() + timeout);
        if let Some(previous) = inner.timer.take() {
            previous.abort();
        }
        if inner.stopped {
            return;
        }
        let epoch = inner.epoch;
        inner.timer = self
            .runtime
            .as_ref()
            .map(|runtime| timers::spawn_deadline(runtime, Arc::downgrade(self), epoch, timeout));
    }

    /// Called by the deadline task.
    fn fire_deadline(self: &Arc<Self>, epoch: u64) {
        let mut inner = self.lock();
        self.deadline_passed(&mut inner, epoch);
    }

    fn deadline_passed(self: &Arc<Self>, inner: &mut Inner, epoch: u64) {
        if inner.epoch != epoch {
            tracing::debug!(
                breaker = %self.name,
                epoch,
                current_epoch = inner.epoch,
                "Ignoring stale deadline"
            );
            return;
        }
        match inner.state {
            State::Open => {
                inner.timer = None;
                self.transition(inner, State::HalfOpen);
            }
            State::HalfOpen => {
                inner.timer = None;
                tracing::warn!(
                    breaker = %self.name,
                    admitted = inner.admitted,
                    reported = inner.counters.requests_continuous,
                    "Half-open requests did not report in time, reopening"
                );
                self.trip(inner);
            }
            State::Closed => {}
        }
    }

    /// Called by the periodic reset task.
    fn reset_totals(&self) {
        let mut inner = self.lock();
        if inner.state == State::Closed {
            inner.counters.clear_totals();
            tracing::debug!(breaker = %self.name, "Cleared total counters");
        } else {
            tracing::debug!(
                breaker = %self.name,
                state = %inner.state,
                "Skipping counter reset, breaker not closed"
            );
        }
    }
}
