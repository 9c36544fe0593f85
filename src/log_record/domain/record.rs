//! Log record aggregate and its natural identity.

use super::{LogLevel, LogRecordDomainError, LogSource, RecordId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Exception metadata attached to an error record.
///
/// All three fields are empty when no exception block was found. The values
/// are mined from free text and may be imprecise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionDetails {
    /// Exception class or type name.
    pub exception_type: String,
    /// Exception message.
    pub exception_value: String,
    /// Rendered stack trace.
    pub stack_trace: String,
}

impl ExceptionDetails {
    /// Returns `true` when no exception data is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exception_type.is_empty()
            && self.exception_value.is_empty()
            && self.stack_trace.is_empty()
    }
}

/// Natural identity of a locally parsed record.
///
/// Two local records with the same timestamp, logger and message are the
/// same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalIdentity {
    timestamp: DateTime<Utc>,
    logger: String,
    message: String,
}

impl LocalIdentity {
    /// Creates an identity from its components.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            logger: logger.into(),
            message: message.into(),
        }
    }

    /// Returns the record timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the logger name.
    #[must_use]
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns a stable hex digest of the identity.
    ///
    /// The digest backs a uniqueness constraint in persistent stores, so its
    /// input layout must not change.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update([0_u8]);
        hasher.update(self.logger.as_bytes());
        hasher.update([0_u8]);
        hasher.update(self.message.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

/// Parameter object for creating a new log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogRecord {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Severity level.
    pub level: LogLevel,
    /// Emitting logger name.
    pub logger: String,
    /// Message text.
    pub message: String,
    /// Exception metadata, empty when absent.
    pub exception: ExceptionDetails,
    /// Collection source.
    pub source: LogSource,
    /// Event identifier assigned by the remote tracker.
    pub external_event_id: Option<String>,
    /// Grouped issue identifier assigned by the remote tracker.
    pub remote_issue_id: Option<String>,
}

impl NewLogRecord {
    /// Creates a local record description without exception data.
    #[must_use]
    pub fn local(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        logger: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            logger: logger.into(),
            message: message.into(),
            exception: ExceptionDetails::default(),
            source: LogSource::Local,
            external_event_id: None,
            remote_issue_id: None,
        }
    }

    /// Creates a remote record description keyed by an external event id.
    #[must_use]
    pub fn remote(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        logger: impl Into<String>,
        message: impl Into<String>,
        event_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            logger: logger.into(),
            message: message.into(),
            exception: ExceptionDetails::default(),
            source: LogSource::Remote,
            external_event_id: Some(event_id.into()),
            remote_issue_id: None,
        }
    }

    /// Attaches exception metadata.
    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionDetails) -> Self {
        self.exception = exception;
        self
    }

    /// Attaches the grouped remote issue identifier.
    #[must_use]
    pub fn with_remote_issue_id(mut self, issue_id: impl Into<String>) -> Self {
        self.remote_issue_id = Some(issue_id.into());
        self
    }
}

/// Structured log record aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    id: RecordId,
    timestamp: DateTime<Utc>,
    level: LogLevel,
    logger: String,
    message: String,
    exception: ExceptionDetails,
    source: LogSource,
    external_event_id: Option<String>,
    remote_issue_id: Option<String>,
    analyzed: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLogRecordData {
    /// Persisted record identifier.
    pub id: RecordId,
    /// Persisted event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Persisted level.
    pub level: LogLevel,
    /// Persisted logger name.
    pub logger: String,
    /// Persisted message.
    pub message: String,
    /// Persisted exception metadata.
    pub exception: ExceptionDetails,
    /// Persisted source.
    pub source: LogSource,
    /// Persisted external event identifier, if any.
    pub external_event_id: Option<String>,
    /// Persisted remote issue identifier, if any.
    pub remote_issue_id: Option<String>,
    /// Persisted analysis flag.
    pub analyzed: bool,
    /// Persisted ingestion timestamp.
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    /// Creates a new, unanalyzed log record.
    ///
    /// # Errors
    ///
    /// Returns [`LogRecordDomainError::EmptyLogger`] when the logger name is
    /// blank, or [`LogRecordDomainError::MissingEventId`] when a remote record
    /// lacks its external event identifier.
    pub fn new(data: NewLogRecord, clock: &impl Clock) -> Result<Self, LogRecordDomainError> {
        let logger = data.logger.trim();
        if logger.is_empty() {
            return Err(LogRecordDomainError::EmptyLogger);
        }
        let external_event_id = data
            .external_event_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty());
        if data.source == LogSource::Remote && external_event_id.is_none() {
            return Err(LogRecordDomainError::MissingEventId);
        }

        Ok(Self {
            id: RecordId::new(),
            timestamp: data.timestamp,
            level: data.level,
            logger: logger.to_owned(),
            message: data.message,
            exception: data.exception,
            source: data.source,
            external_event_id,
            remote_issue_id: data.remote_issue_id,
            analyzed: false,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLogRecordData) -> Self {
        Self {
            id: data.id,
            timestamp: data.timestamp,
            level: data.level,
            logger: data.logger,
            message: data.message,
            exception: data.exception,
            source: data.source,
            external_event_id: data.external_event_id,
            remote_issue_id: data.remote_issue_id,
            analyzed: data.analyzed,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the logger name.
    #[must_use]
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the exception metadata.
    #[must_use]
    pub const fn exception(&self) -> &ExceptionDetails {
        &self.exception
    }

    /// Returns the collection source.
    #[must_use]
    pub const fn source(&self) -> LogSource {
        self.source
    }

    /// Returns the external event identifier, if any.
    #[must_use]
    pub fn external_event_id(&self) -> Option<&str> {
        self.external_event_id.as_deref()
    }

    /// Returns the grouped remote issue identifier, if any.
    #[must_use]
    pub fn remote_issue_id(&self) -> Option<&str> {
        self.remote_issue_id.as_deref()
    }

    /// Returns whether the record has been classified.
    #[must_use]
    pub const fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// Returns when the record was ingested.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the natural identity used for local deduplication.
    #[must_use]
    pub fn local_identity(&self) -> LocalIdentity {
        LocalIdentity::new(self.timestamp, self.logger.clone(), self.message.clone())
    }

    /// Marks the record as classified.
    pub const fn mark_analyzed(&mut self) {
        self.analyzed = true;
    }
}
