//! Stage timings for a pipeline run and logging setup.
//!
//! Provides structured logging and timing so a run's report can show where
//! the time went.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Timing and row count of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: f64,
    pub rows: usize,
}

/// Collected stage timings of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    stages: Vec<StageTiming>,
}

impl RunMetrics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed stage and logs it.
    pub fn record(&mut self, stage: &str, duration: Duration, rows: usize) {
        let duration_ms = duration.as_secs_f64() * 1000.0;
        tracing::info!(stage = stage, rows = rows, duration_ms = duration_ms, "Stage complete");
        self.stages.push(StageTiming {
            stage: stage.to_string(),
            duration_ms,
            rows,
        });
    }

    /// Runs `f`, recording its duration and the row count it reports.
    pub fn time<T, F>(&mut self, stage: &str, f: F) -> T
    where
        F: FnOnce() -> (T, usize),
    {
        let start = Instant::now();
        let (out, rows) = f();
        self.record(stage, start.elapsed(), rows);
        out
    }

    /// Appends every stage recorded by `other`.
    pub fn merge(&mut self, other: Self) {
        self.stages.extend(other.stages);
    }

    #[must_use]
    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    /// Sum of all recorded stage durations.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.stages.iter().map(|s| s.duration_ms).sum()
    }
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}
