//! Rotated log file scanner.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use mockable::Clock;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LocalLogConfig;
use crate::log_record::domain::{
    LogLevel, LogRecord, NewLogRecord, extract_exception, parse_line,
};

/// Acceptance criteria applied to parsed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanFilter {
    /// Lowest level accepted.
    pub min_level: LogLevel,
    /// Earliest timestamp accepted.
    pub since: DateTime<Utc>,
}

/// Result of a directory scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Accepted records, grouped by file in newest-modified-first order.
    pub records: Vec<LogRecord>,
    /// Number of files read.
    pub scanned_files: usize,
    /// Files that could not be read.
    pub skipped_files: Vec<String>,
}

/// Errors that abort a scan before any file is read.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configured file pattern is not a valid glob.
    #[error("invalid log file pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: globset::Error,
    },

    /// The log directory could not be opened or listed.
    #[error("cannot read log directory {path}: {source}")]
    Directory {
        /// Configured directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Scans a directory of rotated log files.
#[derive(Debug, Clone)]
pub struct LocalLogScanner {
    directory: Utf8PathBuf,
    pattern: String,
    matcher: GlobMatcher,
}

impl LocalLogScanner {
    /// Creates a scanner for the configured directory and rotation pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] when the file pattern is not a
    /// valid glob.
    pub fn new(config: &LocalLogConfig) -> Result<Self, ScanError> {
        let matcher = Glob::new(&config.file_pattern)
            .map_err(|source| ScanError::InvalidPattern {
                pattern: config.file_pattern.clone(),
                source,
            })?
            .compile_matcher();
        Ok(Self {
            directory: config.directory.clone(),
            pattern: config.file_pattern.clone(),
            matcher,
        })
    }

    /// Returns the scanned directory.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Parses every matching file and returns the accepted records.
    ///
    /// A file that cannot be read is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Directory`] when the directory itself cannot be
    /// opened or listed.
    pub fn scan(&self, filter: &ScanFilter, clock: &impl Clock) -> Result<ScanOutcome, ScanError> {
        let dir = Dir::open_ambient_dir(&self.directory, ambient_authority()).map_err(|source| {
            ScanError::Directory {
                path: self.directory.clone(),
                source,
            }
        })?;

        let mut outcome = ScanOutcome::default();
        for file_name in self.matching_files(&dir)? {
            match dir.read(&file_name) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let accepted = parse_content(&content, filter, clock);
                    debug!(file = %file_name, accepted = accepted.len(), "scanned log file");
                    outcome.records.extend(accepted);
                    outcome.scanned_files = outcome.scanned_files.saturating_add(1);
                }
                Err(err) => {
                    warn!(file = %file_name, error = %err, "skipping unreadable log file");
                    outcome.skipped_files.push(file_name);
                }
            }
        }

        info!(
            directory = %self.directory,
            pattern = %self.pattern,
            files = outcome.scanned_files,
            records = outcome.records.len(),
            "local log scan finished"
        );
        Ok(outcome)
    }

    /// Lists matching regular files, most recently modified first.
    fn matching_files(&self, dir: &Dir) -> Result<Vec<String>, ScanError> {
        let entries = dir.entries().map_err(|source| ScanError::Directory {
            path: self.directory.clone(),
            source,
        })?;

        let mut files: Vec<(SystemTime, String)> = Vec::new();
        for item in entries {
            let Ok(entry) = item else { continue };
            let Ok(name) = entry.file_name() else { continue };
            if !self.matcher.is_match(name.as_str()) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                warn!(file = %name, "skipping log file without metadata");
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map(cap_std::time::SystemTime::into_std)
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((modified, name));
        }

        files.sort_by(|left, right| right.0.cmp(&left.0).then_with(|| left.1.cmp(&right.1)));
        Ok(files.into_iter().map(|(_, name)| name).collect())
    }
}

/// Parses the content of one log file.
///
/// Exception blocks are looked up within the same file only.
#[must_use]
pub(crate) fn parse_content(content: &str, filter: &ScanFilter, clock: &impl Clock) -> Vec<LogRecord> {
    let lines: Vec<&str> = content.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let parsed = parse_line(line)?;
            if parsed.level < filter.min_level || parsed.timestamp < filter.since {
                return None;
            }
            let mut data =
                NewLogRecord::local(parsed.timestamp, parsed.level, parsed.logger, parsed.message);
            if parsed.level.is_error() {
                data = data.with_exception(extract_exception(&lines, index));
            }
            match LogRecord::new(data, clock) {
                Ok(record) => Some(record),
                Err(err) => {
                    debug!(line = index, error = %err, "rejecting parsed line");
                    None
                }
            }
        })
        .collect()
}
