//! Shared test utilities for the promql-bench workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A stub `query_range` HTTP server with configurable latency and status
//! - Query file fixtures written to temporary files
//! - Synthetic query generators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{StubPrometheus, StubBehavior, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod server;

pub use fixtures::*;
pub use generators::*;
pub use server::{RecordedRequest, StubBehavior, StubPrometheus};

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(2.5_f64, 2.5001_f64, 0.001_f64); // passes
/// assert_approx_eq!(2.6_f64, 2.5_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        if (left - right).abs() > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n epsilon: `{:?}`",
                left, right, epsilon
            );
        }
    }};
}
