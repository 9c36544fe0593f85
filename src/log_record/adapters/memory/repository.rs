//! In-memory repository for log records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::log_record::{
    domain::{LocalIdentity, LogLevel, LogRecord, LogSource, RecordId},
    ports::{LogRecordRepository, LogRecordRepositoryError, LogRecordRepositoryResult},
};

/// Thread-safe in-memory log record repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogRecordRepository {
    state: Arc<RwLock<InMemoryLogRecordState>>,
}

#[derive(Debug, Default)]
struct InMemoryLogRecordState {
    records: HashMap<RecordId, LogRecord>,
    fingerprint_index: HashMap<String, RecordId>,
    event_index: HashMap<String, RecordId>,
}

impl InMemoryLogRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LogRecordRepositoryResult<RwLockReadGuard<'_, InMemoryLogRecordState>> {
        self.state.read().map_err(|err| {
            LogRecordRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> LogRecordRepositoryResult<RwLockWriteGuard<'_, InMemoryLogRecordState>> {
        self.state.write().map_err(|err| {
            LogRecordRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl LogRecordRepository for InMemoryLogRecordRepository {
    async fn insert(&self, record: &LogRecord) -> LogRecordRepositoryResult<()> {
        let mut state = self.write()?;

        let fingerprint = (record.source() == LogSource::Local)
            .then(|| record.local_identity().fingerprint());
        if let Some(key) = fingerprint.as_ref()
            && state.fingerprint_index.contains_key(key)
        {
            return Err(LogRecordRepositoryError::DuplicateLocalRecord(key.clone()));
        }
        if let Some(event_id) = record.external_event_id()
            && state.event_index.contains_key(event_id)
        {
            return Err(LogRecordRepositoryError::DuplicateEventId(
                event_id.to_owned(),
            ));
        }

        if let Some(key) = fingerprint {
            state.fingerprint_index.insert(key, record.id());
        }
        if let Some(event_id) = record.external_event_id() {
            state.event_index.insert(event_id.to_owned(), record.id());
        }
        state.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RecordId) -> LogRecordRepositoryResult<Option<LogRecord>> {
        let state = self.read()?;
        Ok(state.records.get(&id).cloned())
    }

    async fn exists_local(&self, identity: &LocalIdentity) -> LogRecordRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state.fingerprint_index.contains_key(&identity.fingerprint()))
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> LogRecordRepositoryResult<Option<LogRecord>> {
        let state = self.read()?;
        Ok(state
            .event_index
            .get(event_id)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn list_unanalyzed(
        &self,
        min_level: LogLevel,
        limit: usize,
    ) -> LogRecordRepositoryResult<Vec<LogRecord>> {
        let state = self.read()?;
        let mut candidates: Vec<LogRecord> = state
            .records
            .values()
            .filter(|record| !record.is_analyzed() && record.level() >= min_level)
            .cloned()
            .collect();
        candidates.sort_by(|left, right| right.timestamp().cmp(&left.timestamp()));
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn mark_analyzed(&self, id: RecordId) -> LogRecordRepositoryResult<()> {
        let mut state = self.write()?;
        let record = state
            .records
            .get_mut(&id)
            .ok_or(LogRecordRepositoryError::NotFound(id))?;
        record.mark_analyzed();
        Ok(())
    }

    async fn count(&self) -> LogRecordRepositoryResult<u64> {
        let state = self.read()?;
        Ok(u64::try_from(state.records.len()).unwrap_or(u64::MAX))
    }
}
