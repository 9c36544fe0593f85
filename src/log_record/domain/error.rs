//! Error types for log record domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing log record values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogRecordDomainError {
    /// The logger name is empty after trimming.
    #[error("logger name must not be empty")]
    EmptyLogger,

    /// A remote record was constructed without an external event identifier.
    #[error("remote log records require an external event identifier")]
    MissingEventId,
}

/// Error returned while parsing log levels from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLogLevelError(pub String);

/// Error returned while parsing log sources from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown log source: {0}")]
pub struct ParseLogSourceError(pub String);
