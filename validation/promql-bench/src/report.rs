//! Results reporting and formatting.

use std::fmt::Write;
use std::str::FromStr;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::metrics::Statistics;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format '{}' (expected table, text, json or csv)",
                other
            )),
        }
    }
}

/// Formats benchmark statistics for output.
pub struct StatsReport;

impl StatsReport {
    /// Render in the requested format.
    pub fn render(stats: &Statistics, format: OutputFormat) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Table => Self::format_table(stats),
            OutputFormat::Text => Self::format_text(stats),
            OutputFormat::Json => Self::format_json(stats)?,
            OutputFormat::Csv => format!("{}\n{}", Self::csv_header(), Self::format_csv(stats)),
        })
    }

    /// Plain line-per-figure summary followed by the error list.
    pub fn format_text(stats: &Statistics) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Number of queries processed: {}", stats.processed);
        let _ = writeln!(
            out,
            "Total processing time across all queries: {}ms",
            stats.total_ms
        );
        match &stats.latency {
            Some(l) => {
                let _ = writeln!(out, "Minimum query time (for a single query): {}ms", l.fastest_ms);
                let _ = writeln!(out, "Maximum query time (for a single query): {}ms", l.slowest_ms);
                let _ = writeln!(out, "Median query time: {:.3}ms", l.median_ms);
                let _ = writeln!(out, "Average query time: {:.3}ms", l.average_ms);
            }
            None => {
                let _ = writeln!(out, "Query times: n/a (no successful queries)");
            }
        }

        if !stats.errors.is_empty() {
            let _ = writeln!(out, "Errors ({}):", stats.errors.len());
            for error in &stats.errors {
                let _ = writeln!(out, "  {}", error);
            }
        }
        out
    }

    /// Format statistics as a console table.
    pub fn format_table(stats: &Statistics) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Query Benchmark Results"]);

        table.add_row(vec!["Processed:", &stats.processed.to_string()]);
        table.add_row(vec!["Errors:", &stats.errors.len().to_string()]);
        table.add_row(vec![
            "Success Rate:",
            &format!("{:.1}%", stats.success_rate()),
        ]);
        table.add_row(vec!["Total Time:", &format!("{}ms", stats.total_ms)]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Latency (ms)", "min / median / avg / max"]);
        table.add_row(vec!["", &Self::latency_line(stats)]);
        table.add_row(vec!["", "p90 / p95 / p99"]);
        table.add_row(vec![
            "",
            &stats
                .latency
                .as_ref()
                .map(|l| format!("{:.1} / {:.1} / {:.1}", l.p90_ms, l.p95_ms, l.p99_ms))
                .unwrap_or_else(|| "n/a".to_string()),
        ]);

        if !stats.errors.is_empty() {
            table.add_row(vec!["", ""]);
            for error in &stats.errors {
                table.add_row(vec!["Error:", error.as_str()]);
            }
        }

        table.to_string()
    }

    /// Format statistics as JSON.
    pub fn format_json(stats: &Statistics) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(stats)?)
    }

    /// Format statistics as a CSV row.
    pub fn format_csv(stats: &Statistics) -> String {
        let latency = match &stats.latency {
            Some(l) => format!(
                "{},{},{:.3},{:.3},{:.1},{:.1},{:.1}",
                l.fastest_ms, l.slowest_ms, l.median_ms, l.average_ms, l.p90_ms, l.p95_ms, l.p99_ms
            ),
            None => ",,,,,,".to_string(),
        };
        format!(
            "{},{},{},{},{}",
            chrono::Utc::now().to_rfc3339(),
            stats.processed,
            stats.errors.len(),
            stats.total_ms,
            latency
        )
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "timestamp,processed,errors,total_ms,fastest_ms,slowest_ms,median_ms,average_ms,p90_ms,p95_ms,p99_ms"
    }

    fn latency_line(stats: &Statistics) -> String {
        match &stats.latency {
            Some(l) => format!(
                "{} / {:.1} / {:.1} / {}",
                l.fastest_ms, l.median_ms, l.average_ms, l.slowest_ms
            ),
            None => "n/a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LatencyStats;

    fn sample() -> Statistics {
        Statistics {
            processed: 4,
            errors: vec!["query=up [0..1 step 1], error=unexpected response status code: 500".to_string()],
            total_ms: 42,
            latency: Some(LatencyStats {
                fastest_ms: 1,
                slowest_ms: 4,
                median_ms: 2.5,
                average_ms: 2.5,
                p90_ms: 4.0,
                p95_ms: 4.0,
                p99_ms: 4.0,
            }),
        }
    }

    fn empty() -> Statistics {
        Statistics {
            processed: 0,
            errors: Vec::new(),
            total_ms: 0,
            latency: None,
        }
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_report() {
        let text = StatsReport::format_text(&sample());
        assert!(text.contains("Number of queries processed: 4\n"));
        assert!(text.contains("Total processing time across all queries: 42ms\n"));
        assert!(text.contains("Minimum query time (for a single query): 1ms\n"));
        assert!(text.contains("Maximum query time (for a single query): 4ms\n"));
        assert!(text.contains("Median query time: 2.500ms\n"));
        assert!(text.contains("Average query time: 2.500ms\n"));
        assert!(text.contains("Errors (1):"));
        assert!(text.contains("status code: 500"));
    }

    #[test]
    fn test_text_report_without_successes() {
        let text = StatsReport::format_text(&empty());
        assert!(text.contains("n/a"));
        assert!(!text.contains("Errors"));
    }

    #[test]
    fn test_table_report() {
        let table = StatsReport::format_table(&sample());
        assert!(table.contains("Query Benchmark Results"));
        assert!(table.contains("1 / 2.5 / 2.5 / 4"));
        assert!(table.contains("80.0%"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let json = StatsReport::format_json(&sample()).unwrap();
        let parsed: Statistics = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_csv_columns_line_up() {
        let header_cols = StatsReport::csv_header().split(',').count();
        assert_eq!(StatsReport::format_csv(&sample()).split(',').count(), header_cols);
        assert_eq!(StatsReport::format_csv(&empty()).split(',').count(), header_cols);
    }
}
