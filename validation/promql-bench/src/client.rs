//! Range-query execution against a Prometheus-compatible HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use crate::error::{BenchError, BenchResult, QueryError};
use crate::outcome::QueryTiming;
use crate::query::QueryDescriptor;

/// Schemes accepted as an explicit prefix on the target address.
const KNOWN_SCHEMES: [&str; 3] = ["https", "http", "ftp"];

/// Scheme used when the target address carries none.
pub const DEFAULT_SCHEME: &str = "https";

/// Runs a single query and reports how long the round-trip took.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute one query. Exactly one outbound call per invocation, no retries.
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryTiming, QueryError>;
}

/// Split a recognized `scheme://` prefix off a target address.
///
/// Returns `(None, target)` when no known scheme is present.
pub fn split_scheme(target: &str) -> (Option<&str>, &str) {
    for scheme in KNOWN_SCHEMES {
        if let Some(rest) = target
            .strip_prefix(scheme)
            .and_then(|r| r.strip_prefix("://"))
        {
            return (Some(scheme), rest);
        }
    }
    (None, target)
}

/// Render epoch milliseconds as an RFC3339 UTC timestamp with second precision.
pub fn format_epoch_millis(ms: i64) -> Result<String, QueryError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or(QueryError::InvalidTimestamp(ms))
}

/// HTTP executor for `/api/{version}/query_range`.
#[derive(Debug, Clone)]
pub struct PromClient {
    client: Client,
    base_url: Url,
    api_version: String,
    timeout: Duration,
}

impl PromClient {
    /// Create a client for `target`, which may omit its scheme.
    pub fn new(target: &str, api_version: &str, timeout: Duration) -> BenchResult<Self> {
        let (scheme, host) = split_scheme(target.trim());
        let scheme = scheme.unwrap_or(DEFAULT_SCHEME);

        let base_url = Url::parse(&format!("{}://{}", scheme, host)).map_err(|e| {
            BenchError::InvalidSetting {
                setting: "url",
                message: format!("'{}': {}", target, e),
            }
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_version: api_version.to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full request URL for a query.
    pub fn query_url(&self, query: &QueryDescriptor) -> Result<Url, QueryError> {
        let start = format_epoch_millis(query.start_ms)?;
        let end = format_epoch_millis(query.end_ms)?;

        let mut url = self.base_url.clone();
        url.set_path(&format!("/api/{}/query_range", self.api_version));
        url.query_pairs_mut()
            .clear()
            .append_pair("query", &query.text)
            .append_pair("start", &start)
            .append_pair("end", &end)
            .append_pair("step", &query.step.to_string());

        Ok(url)
    }
}

#[async_trait]
impl QueryExecutor for PromClient {
    #[instrument(skip(self, query), fields(query = %query.text))]
    async fn execute(&self, query: &QueryDescriptor) -> Result<QueryTiming, QueryError> {
        let url = self.query_url(query)?;

        let start_ms = Utc::now().timestamp_millis();
        let result = self.client.get(url).send().await;
        let end_ms = Utc::now().timestamp_millis();

        let response = result.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout(self.timeout.as_millis() as u64)
            } else {
                QueryError::Transport(e.to_string())
            }
        })?;

        if response.status() != StatusCode::OK {
            return Err(QueryError::Status(response.status().as_u16()));
        }

        debug!(elapsed_ms = end_ms - start_ms, "Query completed");
        Ok(QueryTiming::new(start_ms, end_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client(target: &str) -> PromClient {
        PromClient::new(target, "v1", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_split_scheme() {
        assert_eq!(
            split_scheme("https://example.xyz"),
            (Some("https"), "example.xyz")
        );
        assert_eq!(split_scheme("ftp://example.xyz"), (Some("ftp"), "example.xyz"));
        assert_eq!(
            split_scheme("http://example.xyz:9201"),
            (Some("http"), "example.xyz:9201")
        );
        assert_eq!(split_scheme("://example.xyz"), (None, "://example.xyz"));
        assert_eq!(split_scheme("example.xyz"), (None, "example.xyz"));
    }

    #[test]
    fn test_scheme_defaults_to_https() {
        let c = client("promscale.xyz");
        assert_eq!(c.base_url().scheme(), "https");
        assert_eq!(c.base_url().host_str(), Some("promscale.xyz"));
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let c = client("http://localhost:9201");
        assert_eq!(c.base_url().scheme(), "http");
        assert_eq!(c.base_url().port(), Some(9201));
    }

    #[test]
    fn test_unparsable_target_is_config_error() {
        let err = PromClient::new("://example.xyz", "v1", Duration::from_secs(1)).unwrap_err();
        assert!(err.is_config_error(), "{err}");
    }

    #[test]
    fn test_format_epoch_millis() {
        assert_eq!(format_epoch_millis(100_000).unwrap(), "1970-01-01T00:01:40Z");
        assert_eq!(format_epoch_millis(999_999).unwrap(), "1970-01-01T00:16:39Z");
        assert_eq!(
            format_epoch_millis(1_597_056_698_698).unwrap(),
            "2020-08-10T10:51:38Z"
        );
        assert_eq!(
            format_epoch_millis(i64::MAX),
            Err(QueryError::InvalidTimestamp(i64::MAX))
        );
    }

    #[test]
    fn test_query_url() {
        let c = client("https://promscale.xyz");
        let url = c
            .query_url(&QueryDescriptor::new("some query", 100_000, 999_999, 50))
            .unwrap();

        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("promscale.xyz"));
        assert_eq!(url.path(), "/api/v1/query_range");

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["query"], "some query");
        assert_eq!(params["start"], "1970-01-01T00:01:40Z");
        assert_eq!(params["end"], "1970-01-01T00:16:39Z");
        assert_eq!(params["step"], "50");
        assert!(url.as_str().contains("query=some+query"));
    }

    #[test]
    fn test_query_url_replaces_target_path() {
        let c = PromClient::new("http://localhost:9201/ignored", "v2", Duration::from_secs(1))
            .unwrap();
        let url = c.query_url(&QueryDescriptor::new("up", 0, 0, 1)).unwrap();
        assert_eq!(url.path(), "/api/v2/query_range");
    }

    #[test]
    fn test_query_url_rejects_out_of_range_timestamp() {
        let c = client("localhost");
        let err = c
            .query_url(&QueryDescriptor::new("up", i64::MIN, 0, 1))
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidTimestamp(i64::MIN));
    }
}
