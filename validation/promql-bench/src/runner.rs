//! Bounded-concurrency query dispatch.
//!
//! Every descriptor gets its own task, but a task only runs its query while
//! holding a semaphore permit, so at most `concurrency` queries are in flight.
//! Outcomes are sent over a channel to a single collector, which is the only
//! writer of the batch.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use crate::client::QueryExecutor;
use crate::error::{BenchError, BenchResult, QueryError};
use crate::outcome::{BatchResult, ExecutionOutcome};
use crate::query::QueryDescriptor;

/// Fans queries out over a fixed number of permits and joins on all of them.
pub struct Dispatcher {
    executor: Arc<dyn QueryExecutor>,
    concurrency: usize,
    show_progress: bool,
}

impl Dispatcher {
    /// Create a dispatcher. `concurrency` must be at least 1.
    pub fn new(executor: Arc<dyn QueryExecutor>, concurrency: usize) -> BenchResult<Self> {
        if concurrency == 0 {
            return Err(BenchError::InvalidSetting {
                setting: "workers",
                message: "concurrency must be > 0".to_string(),
            });
        }

        Ok(Self {
            executor,
            concurrency,
            show_progress: false,
        })
    }

    /// Draw a progress bar on stderr while the batch runs.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every query once and wait for all of them.
    ///
    /// Individual failures are recorded in the batch; this never fails as a
    /// whole. The returned outcomes are in submission order.
    pub async fn run(&self, queries: Vec<QueryDescriptor>) -> BatchResult {
        let total = queries.len();
        info!(
            queries = total,
            concurrency = self.concurrency,
            "Starting benchmark batch"
        );

        let pb = self.progress_bar(total as u64);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ExecutionOutcome)>();

        let started_at = Utc::now();
        let start = Instant::now();

        for (index, query) in queries.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let executor = self.executor.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let cause = QueryError::Aborted("permit pool closed".to_string());
                        let _ = tx.send((index, ExecutionOutcome::failure(query, cause)));
                        return;
                    }
                };

                let outcome = match executor.execute(&query).await {
                    Ok(timing) => ExecutionOutcome::success(query, timing),
                    Err(cause) => ExecutionOutcome::failure(query, cause),
                };

                drop(permit);
                let _ = tx.send((index, outcome));
            });
        }

        // Only the task clones keep the channel open from here on.
        drop(tx);

        let mut slots: Vec<Option<ExecutionOutcome>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = rx.recv().await {
            match &outcome {
                ExecutionOutcome::Success(s) => {
                    debug!(
                        index,
                        elapsed_ms = s.timing.elapsed_ms(),
                        "Query succeeded"
                    );
                }
                ExecutionOutcome::Failure(f) => {
                    warn!(index, query = %f.query.text, error = %f.cause, "Query failed");
                }
            }
            slots[index] = Some(outcome);
            pb.inc(1);
        }

        let elapsed = start.elapsed();
        let finished_at = Utc::now();

        // A task that panicked dropped its sender without reporting.
        let outcomes: Vec<ExecutionOutcome> = slots
            .into_iter()
            .zip(queries)
            .map(|(slot, query)| {
                slot.unwrap_or_else(|| {
                    warn!(query = %query.text, "Worker task ended without reporting");
                    ExecutionOutcome::failure(
                        query,
                        QueryError::Aborted("worker task ended without reporting".to_string()),
                    )
                })
            })
            .collect();

        pb.finish_with_message("Complete!");

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            queries = total,
            failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Benchmark batch finished"
        );

        BatchResult {
            outcomes,
            started_at,
            finished_at,
            elapsed,
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} queries {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    }
}
