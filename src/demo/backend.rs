//! Flaky HTTP backend.
//!
//! Answers `GET /` with 200, or with 500 at a configurable probability. The
//! probability can be changed while the server runs, which lets tests take
//! the dependency down and bring it back.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::BackendConfig;
use crate::lifecycle::Shutdown;

/// Requests answered by the backend so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    pub ok: u64,
    pub failed: u64,
}

#[derive(Debug)]
struct BackendState {
    /// `f64` bits.
    failure_probability: AtomicU64,
    ok: AtomicU64,
    failed: AtomicU64,
}

/// A running flaky backend.
#[derive(Debug)]
pub struct FlakyBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    task: JoinHandle<io::Result<()>>,
}

impl FlakyBackend {
    /// Bind and start serving. Stops when `shutdown` is triggered.
    pub async fn start(config: &BackendConfig, shutdown: &Shutdown) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(BackendState {
            failure_probability: AtomicU64::new(config.failure_probability.to_bits()),
            ok: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });

        let app = Router::new()
            .route("/", get(flaky_handler))
            .with_state(state.clone());

        let mut stop = shutdown.subscribe();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.recv().await;
                })
                .await
        });

        tracing::info!(
            address = %addr,
            failure_probability = config.failure_probability,
            "Flaky backend listening"
        );

        Ok(Self { addr, state, task })
    }

    /// Address the backend is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the backend.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Change the failure probability of subsequent requests.
    pub fn set_failure_probability(&self, probability: f64) {
        self.state
            .failure_probability
            .store(probability.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Requests answered so far.
    pub fn stats(&self) -> BackendStats {
        BackendStats {
            ok: self.state.ok.load(Ordering::Relaxed),
            failed: self.state.failed.load(Ordering::Relaxed),
        }
    }

    /// Wait for the server to finish after shutdown was triggered.
    pub async fn join(self) -> io::Result<()> {
        self.task.await.map_err(io::Error::other)?
    }
}

async fn flaky_handler(State(state): State<Arc<BackendState>>) -> StatusCode {
    let probability = f64::from_bits(state.failure_probability.load(Ordering::Relaxed));

    if rand::random::<f64>() < probability {
        state.failed.fetch_add(1, Ordering::Relaxed);
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        state.ok.fetch_add(1, Ordering::Relaxed);
        StatusCode::OK
    }
}
