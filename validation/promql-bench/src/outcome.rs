//! Per-query outcomes and the batch they are collected into.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::QueryError;
use crate::metrics::{self, Statistics};
use crate::query::QueryDescriptor;

/// Wall-clock window measured by the client around one call, in epoch
/// milliseconds. Independent of the range the query asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryTiming {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl QueryTiming {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// A query that got a 200 back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySuccess {
    pub query: QueryDescriptor,
    pub timing: QueryTiming,
}

/// A query that did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFailure {
    pub query: QueryDescriptor,
    #[serde(serialize_with = "serialize_display")]
    pub cause: QueryError,
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query={}, error={}", self.query, self.cause)
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &QueryError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Result of running one descriptor. Exactly one is produced per submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success(QuerySuccess),
    Failure(QueryFailure),
}

impl ExecutionOutcome {
    pub fn success(query: QueryDescriptor, timing: QueryTiming) -> Self {
        ExecutionOutcome::Success(QuerySuccess { query, timing })
    }

    pub fn failure(query: QueryDescriptor, cause: QueryError) -> Self {
        ExecutionOutcome::Failure(QueryFailure { query, cause })
    }

    pub fn query(&self) -> &QueryDescriptor {
        match self {
            ExecutionOutcome::Success(s) => &s.query,
            ExecutionOutcome::Failure(f) => &f.query,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }
}

/// Everything one dispatcher run produced.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One entry per submitted descriptor, in submission order
    pub outcomes: Vec<ExecutionOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration of the whole batch
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &QuerySuccess> {
        self.outcomes.iter().filter_map(|o| match o {
            ExecutionOutcome::Success(s) => Some(s),
            ExecutionOutcome::Failure(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ExecutionOutcome::Failure(f) => Some(f),
            ExecutionOutcome::Success(_) => None,
        })
    }

    /// Summarize this batch.
    pub fn statistics(&self) -> Statistics {
        metrics::summarize(&self.outcomes, self.elapsed)
    }
}
