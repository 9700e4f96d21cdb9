//! Event log loading and the line-oriented log format.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::log::{EventLog, Trace};

/// Parse the plain log format: one trace per line, activities separated by
/// whitespace. `#` starts a comment, blank lines are skipped, and a leading
/// `<count>x` token repeats the whole trace.
///
/// Parsing never fails; a malformed multiplicity token is just an activity.
pub fn parse_log(contents: &str) -> EventLog {
    let mut traces = Vec::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let trace = match multiplicity(tokens[0]) {
            Some(count) if tokens.len() > 1 => {
                Trace::with_count(tokens[1..].iter().copied(), count)
            }
            _ => Trace::new(tokens),
        };
        traces.push(trace);
    }
    EventLog::new(traces)
}

/// Read and parse a log file.
pub fn load_log(path: &Path) -> Result<EventLog> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read log file: {}", path.display()))?;
    let log = parse_log(&contents);
    debug!(
        path = %path.display(),
        lines = log.traces.len(),
        instances = log.total_traces(),
        "loaded event log"
    );
    Ok(log)
}

fn multiplicity(token: &str) -> Option<u64> {
    let digits = token
        .strip_suffix('x')
        .or_else(|| token.strip_suffix('×'))?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_traces_with_comments_and_blanks() {
        let log = parse_log("# header\n\na b c\na c b  # trailing note\n");
        assert_eq!(log.traces.len(), 2);
        assert_eq!(log.traces[0], Trace::new(["a", "b", "c"]));
        assert_eq!(log.traces[1], Trace::new(["a", "c", "b"]));
    }

    #[test]
    fn leading_count_token_sets_multiplicity() {
        let log = parse_log("12x a b\n3× b a\n");
        assert_eq!(log.traces[0], Trace::with_count(["a", "b"], 12));
        assert_eq!(log.traces[1], Trace::with_count(["b", "a"], 3));
        assert_eq!(log.total_traces(), 15);
    }

    #[test]
    fn ambiguous_tokens_stay_activities() {
        // A lone "3x" line and a mid-line "2x" are activities, not counts.
        let log = parse_log("3x\na 2x b\nxa b\n");
        assert_eq!(log.traces[0], Trace::new(["3x"]));
        assert_eq!(log.traces[1], Trace::new(["a", "2x", "b"]));
        assert_eq!(log.traces[2], Trace::new(["xa", "b"]));
    }

    #[test]
    fn load_reports_missing_files() {
        let error = load_log(Path::new("/nonexistent/run.log")).unwrap_err();
        assert!(error.to_string().contains("failed to read log file"));
    }
}
