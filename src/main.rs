//! Circuit breaker demo.
//!
//! Starts a flaky HTTP backend, hammers it from several workers through a
//! breaker-guarded client and prints what the breaker counted.
//!
//! ```text
//! circuit-breaker --config demo.toml --workers 10 --requests 1000
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;

use circuit_breaker::config::loader::{load_config, ConfigError};
use circuit_breaker::config::validation::validate_config;
use circuit_breaker::config::DemoConfig;
use circuit_breaker::demo::{run_load, FlakyBackend, GuardedClient};
use circuit_breaker::lifecycle::signals::shutdown_on_signal;
use circuit_breaker::observability::{logging, metrics};
use circuit_breaker::{CircuitBreaker, Settings, Shutdown};

#[derive(Parser)]
#[command(name = "circuit-breaker")]
#[command(about = "Drive a flaky HTTP backend through a circuit breaker", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent workers.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Attempts per worker.
    #[arg(short, long)]
    requests: Option<usize>,

    /// Probability that the backend answers with a 500.
    #[arg(short, long)]
    failure_probability: Option<f64>,
}

impl Cli {
    fn load(&self) -> Result<DemoConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DemoConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.load.workers = workers;
        }
        if let Some(requests) = self.requests {
            config.load.requests_per_worker = requests;
        }
        if let Some(p) = self.failure_probability {
            config.backend.failure_probability = p;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let backend = FlakyBackend::start(&config.backend, &shutdown).await?;

    let breaker = Arc::new(CircuitBreaker::named(
        config.breaker.name.clone(),
        Settings::from(&config.breaker),
    ));
    let client = Arc::new(GuardedClient::new(
        breaker.clone(),
        Duration::from_millis(config.load.request_timeout_ms),
    )?);

    let report = run_load(client, backend.url(), &config.load, &shutdown).await;

    let backend_stats = backend.stats();
    shutdown.trigger();
    backend.join().await?;
    breaker.shutdown();

    let output = json!({
        "breaker": breaker.name(),
        "state": breaker.state(),
        "counters": breaker.counters(),
        "load": report,
        "backend": backend_stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
