//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for the store runtime:
//! - Intent intake and rejection
//! - Reducer execution and failures
//! - Observer lag
//!
//! # Example
//!
//! ```rust,no_run
//! use mvi_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... run stores ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder for store metrics.
///
/// Installs a process-wide recorder and renders the collected metrics in the
/// Prometheus text format.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., in tests), this logs a
    /// warning and leaves `render()` returning `None`.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_001, 0.000_01, 0.000_1, 0.001, 0.01, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the recorder hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "store_intents_processed_total",
        "Total number of intents accepted by model stores"
    );
    describe_counter!(
        "store_intents_rejected_total",
        "Total number of intents rejected because the store was halted or shut down"
    );
    describe_counter!(
        "store_reducers_applied_total",
        "Total number of reducers applied and published"
    );
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time spent applying a single reducer"
    );
    describe_counter!(
        "store_reducers_inconsistent_total",
        "Total number of reducers that reported an inconsistent state"
    );
    describe_counter!(
        "store_observer_lagged_total",
        "Total number of state snapshots skipped by lagging observers"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an intent accepted for processing.
    pub fn record_intent() {
        counter!("store_intents_processed_total").increment(1);
    }

    /// Record an intent rejected at intake.
    pub fn record_rejected() {
        counter!("store_intents_rejected_total").increment(1);
    }

    /// Record a reducer applied and published.
    pub fn record_reducer(duration: Duration) {
        counter!("store_reducers_applied_total").increment(1);
        histogram!("store_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a reducer that reported an inconsistent state.
    pub fn record_inconsistent() {
        counter!("store_reducers_inconsistent_total").increment(1);
    }

    /// Record snapshots skipped by a lagging observer.
    pub fn record_lag(skipped: u64) {
        counter!("store_observer_lagged_total").increment(skipped);
    }
}
