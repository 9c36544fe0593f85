//! Severity levels and sources shared by local and remote log records.

use super::{ParseLogLevelError, ParseLogSourceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log level ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic output.
    Debug,
    /// Informational output.
    Info,
    /// Something unexpected that did not fail the operation.
    Warning,
    /// An operation failed.
    Error,
    /// The process or a subsystem cannot continue.
    Critical,
}

impl LogLevel {
    /// Returns the canonical uppercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns `true` for levels that carry an exception block.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }

    /// Maps a level reported by a remote error tracker.
    ///
    /// Remote trackers use a wider vocabulary (`fatal`, `warn`) than the
    /// local line grammar. Anything unrecognised is treated as an error.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARNING" | "WARN" => Self::Warning,
            "CRITICAL" | "FATAL" => Self::Critical,
            _ => Self::Error,
        }
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = ParseLogLevelError;

    fn try_from(value: &str) -> Result<Self, ParseLogLevelError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ParseLogLevelError(value.to_owned())),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a log record was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    /// Parsed from a rotated log file on the local filesystem.
    Local,
    /// Fetched from the remote error tracker.
    #[serde(rename = "sentry")]
    Remote,
}

impl LogSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "sentry",
        }
    }
}

impl TryFrom<&str> for LogSource {
    type Error = ParseLogSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "sentry" => Ok(Self::Remote),
            _ => Err(ParseLogSourceError(value.to_owned())),
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
