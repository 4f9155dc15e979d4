//! HTTP client guarded by a circuit breaker.
//!
//! # Failure Classification
//! - Connection errors and timeouts are failures
//! - 5xx responses are failures
//! - Everything else, 4xx included, is a success: the backend answered

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use crate::breaker::CircuitBreaker;

/// Why a guarded request did not produce a usable response.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The breaker refused the request; nothing was sent.
    #[error("circuit breaker `{0}` rejected the request")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {0}")]
    Status(StatusCode),
}

impl GuardError {
    /// Whether the breaker rejected the request before it was sent.
    pub fn is_rejected(&self) -> bool {
        matches!(self, GuardError::Rejected(_))
    }
}

/// A `reqwest` client that asks a breaker before every request and reports
/// the outcome afterwards.
#[derive(Debug, Clone)]
pub struct GuardedClient {
    client: Client,
    breaker: Arc<CircuitBreaker>,
}

impl GuardedClient {
    /// Build a client with the given per-request timeout.
    pub fn new(breaker: Arc<CircuitBreaker>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client, breaker })
    }

    /// The breaker guarding this client.
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// `GET url` if the breaker allows it.
    ///
    /// Dropping the future after admission leaves the outcome unreported; a
    /// half-open breaker then reopens once its window runs out.
    pub async fn get(&self, url: &str) -> Result<Response, GuardError> {
        if !self.breaker.allow() {
            return Err(GuardError::Rejected(self.breaker.name().to_string()));
        }

        match self.client.get(url).send().await {
            Ok(response) if response.status().is_server_error() => {
                self.breaker.register_error();
                Err(GuardError::Status(response.status()))
            }
            Ok(response) => {
                self.breaker.register_ok();
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "Guarded request failed");
                self.breaker.register_error();
                Err(GuardError::Transport(e))
            }
        }
    }
}
