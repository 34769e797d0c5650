//! Load testing tool for Prometheus-compatible range-query endpoints.
//!
//! This crate provides tools to:
//! - Read a list of range queries from a pipe-delimited file
//! - Replay them against a `query_range` API with bounded concurrency
//! - Compute latency statistics over the results
//! - Output results in multiple formats (table, text, JSON, CSV)

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod outcome;
pub mod query;
pub mod report;
pub mod runner;

pub use client::{PromClient, QueryExecutor};
pub use config::{BenchConfig, ConfigOverrides};
pub use error::{BenchError, BenchResult, QueryError};
pub use metrics::{summarize, LatencyStats, Statistics};
pub use outcome::{BatchResult, ExecutionOutcome, QueryFailure, QuerySuccess, QueryTiming};
pub use query::{load_queries, read_queries, QueryDescriptor};
pub use report::{OutputFormat, StatsReport};
pub use runner::Dispatcher;
