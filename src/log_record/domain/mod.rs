//! Domain model for structured log records.
//!
//! Covers the line grammar, exception block mining, and the record aggregate
//! shared by local files and the remote error tracker.

mod error;
mod exception;
mod ids;
mod level;
mod line;
mod record;

pub use error::{LogRecordDomainError, ParseLogLevelError, ParseLogSourceError};
pub use exception::extract_exception;
pub use ids::RecordId;
pub use level::{LogLevel, LogSource};
pub use line::{ParsedLine, is_log_line, parse_line};
pub use record::{ExceptionDetails, LocalIdentity, LogRecord, NewLogRecord, PersistedLogRecordData};
