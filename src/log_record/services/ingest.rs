//! Deduplicating persistence of structured log records.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::log_record::{
    domain::{LogRecord, LogSource},
    ports::{LogRecordRepository, LogRecordRepositoryResult},
};

/// Counts produced by one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records newly stored.
    pub inserted: usize,
    /// Records already present.
    pub skipped: usize,
    /// Records that could not be checked or stored.
    pub failed: usize,
}

impl IngestReport {
    fn record(&mut self, outcome: IngestOutcome) {
        let counter = match outcome {
            IngestOutcome::Inserted => &mut self.inserted,
            IngestOutcome::Duplicate => &mut self.skipped,
            IngestOutcome::Failed => &mut self.failed,
        };
        *counter = counter.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestOutcome {
    Inserted,
    Duplicate,
    Failed,
}

/// Stores records exactly once.
///
/// Local records are keyed by timestamp, logger and message. Remote records
/// are keyed by their external event id. Each record is checked before
/// insertion and the store's uniqueness constraints act as a backstop, so
/// re-running a batch inserts nothing new.
#[derive(Clone)]
pub struct IngestService<R>
where
    R: LogRecordRepository,
{
    repository: Arc<R>,
}

impl<R> IngestService<R>
where
    R: LogRecordRepository,
{
    /// Creates a new ingestion service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Persists a batch, isolating failures per record.
    pub async fn persist(&self, records: Vec<LogRecord>) -> IngestReport {
        let mut report = IngestReport::default();
        for record in records {
            let outcome = match self.persist_one(&record).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(record_id = %record.id(), error = %err, "failed to persist log record");
                    IngestOutcome::Failed
                }
            };
            report.record(outcome);
        }
        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "log record batch persisted"
        );
        report
    }

    async fn persist_one(&self, record: &LogRecord) -> LogRecordRepositoryResult<IngestOutcome> {
        if self.already_stored(record).await? {
            debug!(record_id = %record.id(), "skipping duplicate log record");
            return Ok(IngestOutcome::Duplicate);
        }

        match self.repository.insert(record).await {
            Ok(()) => Ok(IngestOutcome::Inserted),
            Err(err) if err.is_duplicate() => {
                debug!(record_id = %record.id(), "uniqueness constraint rejected duplicate");
                Ok(IngestOutcome::Duplicate)
            }
            Err(err) => Err(err),
        }
    }

    async fn already_stored(&self, record: &LogRecord) -> LogRecordRepositoryResult<bool> {
        if let Some(event_id) = record.external_event_id() {
            return Ok(self.repository.find_by_event_id(event_id).await?.is_some());
        }
        match record.source() {
            LogSource::Local => self.repository.exists_local(&record.local_identity()).await,
            LogSource::Remote => Ok(false),
        }
    }
}
