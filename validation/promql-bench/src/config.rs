//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

pub const DEFAULT_URL: &str = "http://localhost:9201";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Settings for one benchmark run, optionally loaded from a YAML scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Query file to replay
    #[serde(default)]
    pub filepath: PathBuf,
    /// Maximum number of queries in flight
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Target address; the scheme defaults to https when omitted
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Per-request client timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_workers() -> usize {
    1
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            filepath: PathBuf::new(),
            workers: default_workers(),
            url: default_url(),
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Values given on the command line. Anything set here wins over the
/// scenario file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub filepath: Option<PathBuf>,
    pub workers: Option<usize>,
    pub url: Option<String>,
    pub api_version: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl BenchConfig {
    /// Load configuration from YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> BenchResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(filepath) = overrides.filepath {
            self.filepath = filepath;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(api_version) = overrides.api_version {
            self.api_version = api_version;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> BenchResult<()> {
        if self.filepath.as_os_str().is_empty() {
            return Err(BenchError::MissingSetting("filepath"));
        }
        if self.workers == 0 {
            return Err(BenchError::InvalidSetting {
                setting: "workers",
                message: "must be > 0".to_string(),
            });
        }
        if self.url.trim().is_empty() {
            return Err(BenchError::MissingSetting("url"));
        }
        if self.api_version.trim().is_empty() {
            return Err(BenchError::MissingSetting("api_version"));
        }
        if self.timeout_ms == 0 {
            return Err(BenchError::InvalidSetting {
                setting: "timeout_ms",
                message: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> BenchConfig {
        BenchConfig {
            filepath: PathBuf::from("promql_queries.csv"),
            ..BenchConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.workers, 1);
        assert_eq!(config.url, "http://localhost:9201");
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_filepath_is_rejected() {
        let err = BenchConfig::default().validate().unwrap_err();
        assert!(matches!(err, BenchError::MissingSetting("filepath")));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let config = BenchConfig {
            workers: 0,
            ..valid()
        };
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = BenchConfig {
            timeout_ms: 0,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_yaml_uses_defaults_for_missing_fields() {
        let config = BenchConfig::from_yaml("filepath: queries.csv\nworkers: 8\n").unwrap();
        assert_eq!(config.filepath, PathBuf::from("queries.csv"));
        assert_eq!(config.workers, 8);
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = BenchConfig::from_yaml("workers: [1, 2").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filepath: q.csv").unwrap();
        writeln!(file, "url: promscale.example:9201").unwrap();
        writeln!(file, "timeout_ms: 2500").unwrap();

        let config = BenchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.url, "promscale.example:9201");
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_overrides_win_over_scenario() {
        let scenario = BenchConfig::from_yaml("filepath: a.csv\nworkers: 4\nurl: http://a\n").unwrap();
        let config = scenario.with_overrides(ConfigOverrides {
            workers: Some(100),
            url: Some("http://b".to_string()),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.filepath, PathBuf::from("a.csv"));
        assert_eq!(config.workers, 100);
        assert_eq!(config.url, "http://b");
    }
}
