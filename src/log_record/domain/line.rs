//! Structured log line grammar.
//!
//! Local log files use one entry per line:
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS [LEVEL] [logger_name] - message text
//! ```
//!
//! Only the first three delimiters are structural. Everything after the
//! ` - ` separator belongs to the message, including further dashes.

use super::LogLevel;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static LINE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) \[(\w+)\] \[([^\]]+)\] - (.*)$").ok()
});

/// A log line that matched the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Timestamp interpreted as UTC.
    pub timestamp: DateTime<Utc>,
    /// Parsed level.
    pub level: LogLevel,
    /// Logger name between the second pair of brackets.
    pub logger: String,
    /// Remaining message text.
    pub message: String,
}

/// Parses one line of text.
///
/// Returns `None` for anything that does not match the grammar, including
/// lines with impossible calendar values or unknown levels. Never panics.
#[must_use]
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let pattern = LINE_PATTERN.as_ref()?;
    let captures = pattern.captures(line)?;

    let raw_timestamp = captures.get(1)?.as_str();
    let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();
    let level = LogLevel::try_from(captures.get(2)?.as_str()).ok()?;
    let logger = captures.get(3)?.as_str().to_owned();
    let message = captures.get(4)?.as_str().to_owned();

    Some(ParsedLine {
        timestamp,
        level,
        logger,
        message,
    })
}

/// Returns `true` when the line matches the grammar.
#[must_use]
pub fn is_log_line(line: &str) -> bool {
    parse_line(line).is_some()
}
