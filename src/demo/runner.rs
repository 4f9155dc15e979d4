//! Concurrent load generator.
//!
//! Each worker pauses, asks the guarded client for `GET /`, and tallies the
//! result. Rejected attempts are skipped, not retried.

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::LoadConfig;
use crate::demo::client::{GuardError, GuardedClient};
use crate::lifecycle::Shutdown;

/// What the workers saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Attempts made, rejected ones included.
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Attempts the breaker refused.
    pub rejected: u64,
}

impl LoadReport {
    fn record(&mut self, result: &Result<reqwest::Response, GuardError>) {
        self.attempted += 1;
        match result {
            Ok(_) => self.succeeded += 1,
            Err(e) if e.is_rejected() => self.rejected += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl AddAssign for LoadReport {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.rejected += other.rejected;
    }
}

/// Run `config.workers` workers against `url` until they finish or
/// `shutdown` fires.
pub async fn run_load(
    client: Arc<GuardedClient>,
    url: String,
    config: &LoadConfig,
    shutdown: &Shutdown,
) -> LoadReport {
    tracing::info!(
        workers = config.workers,
        requests = config.workers * config.requests_per_worker,
        "Starting load"
    );

    let url: Arc<str> = url.into();
    let delay = Duration::from_millis(config.request_delay_ms);
    let mut handles = Vec::with_capacity(config.workers);

    for worker in 0..config.workers {
        let client = client.clone();
        let url = url.clone();
        let requests = config.requests_per_worker;
        let mut stop = shutdown.subscribe();

        handles.push(tokio::spawn(async move {
            let mut report = LoadReport::default();
            for _ in 0..requests {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = stop.recv() => {
                        tracing::debug!(worker, "Worker received shutdown signal");
                        break;
                    }
                }
                let result = client.get(&url).await;
                report.record(&result);
            }
            report
        }));
    }

    let mut total = LoadReport::default();
    for handle in handles {
        match handle.await {
            Ok(report) => total += report,
            Err(e) => tracing::error!(error = %e, "Load worker panicked"),
        }
    }

    tracing::info!(
        attempted = total.attempted,
        succeeded = total.succeeded,
        failed = total.failed,
        rejected = total.rejected,
        "Load finished"
    );
    total
}
