//! Repository port for log record persistence and lookup.

use crate::log_record::domain::{LocalIdentity, LogLevel, LogRecord, RecordId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for log record repository operations.
pub type LogRecordRepositoryResult<T> = Result<T, LogRecordRepositoryError>;

/// Log record persistence contract.
#[async_trait]
pub trait LogRecordRepository: Send + Sync {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`LogRecordRepositoryError::DuplicateLocalRecord`] or
    /// [`LogRecordRepositoryError::DuplicateEventId`] when a uniqueness
    /// constraint rejects the record.
    async fn insert(&self, record: &LogRecord) -> LogRecordRepositoryResult<()>;

    /// Finds a record by identifier.
    async fn find_by_id(&self, id: RecordId) -> LogRecordRepositoryResult<Option<LogRecord>>;

    /// Returns whether a local record with the same natural identity exists.
    async fn exists_local(&self, identity: &LocalIdentity) -> LogRecordRepositoryResult<bool>;

    /// Finds a record by its remote event identifier.
    async fn find_by_event_id(&self, event_id: &str)
    -> LogRecordRepositoryResult<Option<LogRecord>>;

    /// Lists unanalyzed records at or above `min_level`, most recent first.
    async fn list_unanalyzed(
        &self,
        min_level: LogLevel,
        limit: usize,
    ) -> LogRecordRepositoryResult<Vec<LogRecord>>;

    /// Sets the analyzed flag on a record.
    ///
    /// # Errors
    ///
    /// Returns [`LogRecordRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn mark_analyzed(&self, id: RecordId) -> LogRecordRepositoryResult<()>;

    /// Returns the number of stored records.
    async fn count(&self) -> LogRecordRepositoryResult<u64>;
}

/// Errors returned by log record repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LogRecordRepositoryError {
    /// A local record with the same natural identity already exists.
    #[error("duplicate local record: {0}")]
    DuplicateLocalRecord(String),

    /// A record with the same external event identifier already exists.
    #[error("duplicate external event: {0}")]
    DuplicateEventId(String),

    /// The record was not found.
    #[error("log record not found: {0}")]
    NotFound(RecordId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LogRecordRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for uniqueness violations.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateLocalRecord(_) | Self::DuplicateEventId(_)
        )
    }
}
