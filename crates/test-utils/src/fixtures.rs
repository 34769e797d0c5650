//! Query file fixtures.
//!
//! Records use the benchmark's input format, `query|start_ms|end_ms|step`.

use std::io::Write;

use tempfile::NamedTempFile;

/// A single well-formed record.
pub const ONE_QUERY: &str =
    r#"demo_cpu_usage_seconds_total{mode="idle"}|1597056698698|1597059548699|15000"#;

/// A small realistic query file.
pub const SAMPLE_QUERIES: &str = r#"demo_cpu_usage_seconds_total{mode="idle"}|1597056698698|1597059548699|15000
avg by(instance) (demo_cpu_usage_seconds_total)|1597057698698|1597058548699|60000
rate(http_requests_total{job=~"api|web"}[5m])|1597057000000|1597060000000|30000
"#;

/// Second record has only three fields.
pub const MALFORMED_QUERIES: &str = "up|1597056698698|1597059548699|15000\nup|1597056698698|15000\n";

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn write_query_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write query fixture");
    file.flush().expect("Failed to flush query fixture");
    file
}
