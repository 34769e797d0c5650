//! Error types for the query benchmark.
//!
//! Two families live here: [`BenchError`] covers everything that stops a run
//! before the first query is sent, while [`QueryError`] is the cause attached
//! to a single failed query and never escapes the dispatcher.

use thiserror::Error;

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

/// Fatal errors raised while setting up a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    // === Configuration Errors ===
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value for '{setting}': {message}")]
    InvalidSetting {
        setting: &'static str,
        message: String,
    },

    #[error("Failed to read scenario file: {0}")]
    Scenario(#[from] serde_yaml::Error),

    // === Input Errors ===
    #[error("Malformed query record on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Infrastructure Errors ===
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl BenchError {
    /// True for errors caused by bad settings rather than bad input data.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BenchError::MissingSetting(_)
                | BenchError::InvalidSetting { .. }
                | BenchError::Scenario(_)
        )
    }
}

/// Why a single query failed.
///
/// Kept cloneable so that it can be carried inside outcomes and statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("sending request to server: {0}")]
    Transport(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("unexpected response status code: {0}")]
    Status(u16),

    #[error("timestamp {0}ms is out of range")]
    InvalidTimestamp(i64),

    #[error("worker aborted: {0}")]
    Aborted(String),
}

impl QueryError {
    /// True when the server answered, just not with 200.
    pub fn is_server_error(&self) -> bool {
        matches!(self, QueryError::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        assert!(BenchError::MissingSetting("filepath").is_config_error());
        assert!(BenchError::InvalidSetting {
            setting: "workers",
            message: "must be > 0".to_string(),
        }
        .is_config_error());
        assert!(!BenchError::Parse {
            line: 3,
            message: "expected 4 fields".to_string(),
        }
        .is_config_error());
    }

    #[test]
    fn test_query_error_messages() {
        assert_eq!(
            QueryError::Status(503).to_string(),
            "unexpected response status code: 503"
        );
        assert_eq!(
            QueryError::Timeout(1000).to_string(),
            "request timed out after 1000ms"
        );
        assert!(QueryError::Status(500).is_server_error());
        assert!(!QueryError::Timeout(5).is_server_error());
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = BenchError::Parse {
            line: 7,
            message: "invalid step 'abc'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed query record on line 7: invalid step 'abc'"
        );
    }
}
