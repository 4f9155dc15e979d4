//! Background tasks owned by a breaker.
//!
//! Both tasks hold a `Weak` reference to the breaker's shared state and exit
//! once the breaker is gone.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::Shared;

/// Act on the breaker's deadline after `timeout`, unless `epoch` is stale by
/// then: open moves to half-open, an unfinished half-open window reopens.
pub(super) fn spawn_deadline(
    runtime: &Handle,
    shared: Weak<Shared>,
    epoch: u64,
    timeout: Duration,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        time::sleep(timeout).await;
        if let Some(shared) = shared.upgrade() {
            shared.fire_deadline(epoch);
        }
    })
}

/// Clear the total counters every `interval` while the breaker is closed.
pub(super) fn spawn_counter_reset(
    runtime: &Handle,
    shared: Weak<Shared>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        // `interval_at` so the first tick is one full period away.
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(shared) = shared.upgrade() else {
                        break;
                    };
                    shared.reset_totals();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Counter reset task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}
