//! Latency statistics over a finished batch.

use std::time::Duration;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::outcome::ExecutionOutcome;

/// Summary of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of queries that completed successfully
    pub processed: usize,
    /// One entry per failed query
    pub errors: Vec<String>,
    /// Wall-clock time of the whole batch in milliseconds
    pub total_ms: u64,
    /// Latency figures; `None` when no query succeeded
    pub latency: Option<LatencyStats>,
}

impl Statistics {
    /// Total number of queries this summary accounts for.
    pub fn submitted(&self) -> usize {
        self.processed + self.errors.len()
    }

    pub fn success_rate(&self) -> f64 {
        match self.submitted() {
            0 => 0.0,
            n => self.processed as f64 / n as f64 * 100.0,
        }
    }
}

/// Per-query latency in milliseconds across successful queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub fastest_ms: i64,
    pub slowest_ms: i64,
    pub median_ms: f64,
    pub average_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

/// Compute statistics for a set of outcomes.
///
/// Only successes contribute to latency figures; failures are listed in
/// `errors`. `total` is the batch duration measured by the dispatcher and is
/// not derived from per-query timings.
pub fn summarize(outcomes: &[ExecutionOutcome], total: Duration) -> Statistics {
    let mut elapsed = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            ExecutionOutcome::Success(s) => elapsed.push(s.timing.elapsed_ms()),
            ExecutionOutcome::Failure(f) => errors.push(f.to_string()),
        }
    }

    Statistics {
        processed: elapsed.len(),
        errors,
        total_ms: total.as_millis() as u64,
        latency: latency_stats(elapsed),
    }
}

fn latency_stats(mut elapsed: Vec<i64>) -> Option<LatencyStats> {
    if elapsed.is_empty() {
        return None;
    }

    elapsed.sort_unstable();
    let n = elapsed.len();
    let mid = n / 2;

    let median_ms = if n % 2 != 0 {
        elapsed[mid] as f64
    } else {
        (elapsed[mid - 1] as f64 + elapsed[mid] as f64) / 2.0
    };
    let average_ms = elapsed.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let (p90_ms, p95_ms, p99_ms) = percentiles(&elapsed);

    Some(LatencyStats {
        fastest_ms: elapsed[0],
        slowest_ms: elapsed[n - 1],
        median_ms,
        average_ms,
        p90_ms,
        p95_ms,
        p99_ms,
    })
}

/// Tail percentiles from an HDR histogram. Negative samples (clock steps) are
/// clamped to zero.
fn percentiles(sorted: &[i64]) -> (f64, f64, f64) {
    let mut histogram = match Histogram::<u64>::new(3) {
        Ok(h) => h,
        Err(_) => return (0.0, 0.0, 0.0),
    };
    for &value in sorted {
        histogram.saturating_record(value.max(0) as u64);
    }

    (
        histogram.value_at_quantile(0.90) as f64,
        histogram.value_at_quantile(0.95) as f64,
        histogram.value_at_quantile(0.99) as f64,
    )
}
