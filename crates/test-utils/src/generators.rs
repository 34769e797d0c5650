//! Synthetic query generators.

/// First range start used by generated queries (2020-08-10T10:51:38Z).
pub const BASE_START_MS: i64 = 1_597_056_698_000;

/// Build `count` pipe-delimited query records.
///
/// Record `i` asks for `metric_{i % 5}` over a one hour range starting `i`
/// minutes after [`BASE_START_MS`], with a step that cycles through 15s, 30s
/// and 60s.
///
/// ```
/// use test_utils::synthetic_query_file;
///
/// let text = synthetic_query_file(3);
/// assert_eq!(text.lines().count(), 3);
/// assert!(text.starts_with("rate(metric_0_total[5m])|"));
/// ```
pub fn synthetic_query_file(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        let start = BASE_START_MS + i as i64 * 60_000;
        let end = start + 3_600_000;
        let step = [15_000, 30_000, 60_000][i % 3];
        out.push_str(&format!(
            "rate(metric_{}_total[5m])|{}|{}|{}\n",
            i % 5,
            start,
            end,
            step
        ));
    }
    out
}

/// Elapsed times in milliseconds `1..=count`, shuffled deterministically so
/// callers do not accidentally depend on sorted input.
pub fn scrambled_latencies(count: i64) -> Vec<i64> {
    let mut values: Vec<i64> = (1..=count).collect();
    // Interleave from both ends: 1, n, 2, n-1, ...
    let mut out = Vec::with_capacity(values.len());
    while !values.is_empty() {
        out.push(values.remove(0));
        if let Some(last) = values.pop() {
            out.push(last);
        }
    }
    out
}
