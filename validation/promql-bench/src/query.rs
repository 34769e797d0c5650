//! Query descriptors and the pipe-delimited query file reader.
//!
//! Each line of a query file has the form
//! `query_text|start_ms|end_ms|step` with no header row. The numeric fields
//! are split off from the right so that PromQL regex matchers such as
//! `{job=~"api|web"}` survive intact in the query text.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// One replayable range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub text: String,
    /// Range start as epoch milliseconds
    pub start_ms: i64,
    /// Range end as epoch milliseconds
    pub end_ms: i64,
    pub step: i64,
}

impl QueryDescriptor {
    pub fn new(text: impl Into<String>, start_ms: i64, end_ms: i64, step: i64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
            step,
        }
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}..{} step {}]",
            self.text, self.start_ms, self.end_ms, self.step
        )
    }
}

/// Load all queries from a file on disk.
pub fn load_queries(path: impl AsRef<Path>) -> BenchResult<Vec<QueryDescriptor>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_queries(std::io::BufReader::new(file))
}

/// Parse every record from a reader. Blank lines are skipped; any malformed
/// record aborts the whole read.
pub fn read_queries<R: BufRead>(reader: R) -> BenchResult<Vec<QueryDescriptor>> {
    let mut queries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        queries.push(parse_record(line, index + 1)?);
    }

    Ok(queries)
}

fn parse_record(line: &str, line_no: usize) -> BenchResult<QueryDescriptor> {
    let parse_err = |message: String| BenchError::Parse {
        line: line_no,
        message,
    };

    let mut fields = line.rsplitn(4, '|');
    let step = fields.next();
    let end = fields.next();
    let start = fields.next();
    let text = fields.next();

    let (Some(text), Some(start), Some(end), Some(step)) = (text, start, end, step) else {
        return Err(parse_err(format!(
            "expected 4 '|' separated fields, got {}",
            line.split('|').count()
        )));
    };

    let start_ms = parse_int(start, "start").map_err(parse_err)?;
    let end_ms = parse_int(end, "end").map_err(parse_err)?;
    let step = parse_int(step, "step").map_err(parse_err)?;

    Ok(QueryDescriptor {
        text: unquote(text),
        start_ms,
        end_ms,
        step,
    })
}

fn parse_int(field: &str, name: &str) -> Result<i64, String> {
    let value = unquote(field);
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid {} '{}': {}", name, value, e))
}

/// Strip one level of surrounding double quotes, reading `""` as `"`.
/// Fields that are not fully quoted are returned untouched.
fn unquote(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}
