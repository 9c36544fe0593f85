//! `PostgreSQL` repository implementation for log records.

use super::{
    models::{LogRecordRow, NewLogRecordRow},
    schema::log_records,
};
use crate::log_record::{
    domain::{
        ExceptionDetails, LocalIdentity, LogLevel, LogRecord, LogSource, PersistedLogRecordData,
        RecordId,
    },
    ports::{LogRecordRepository, LogRecordRepositoryError, LogRecordRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by log record adapters.
pub type LogRecordPgPool = Pool<ConnectionManager<PgConnection>>;

/// Levels at or above each threshold, in storage form.
fn levels_at_or_above(min_level: LogLevel) -> Vec<&'static str> {
    [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ]
    .into_iter()
    .filter(|level| *level >= min_level)
    .map(LogLevel::as_str)
    .collect()
}

/// `PostgreSQL`-backed log record repository.
#[derive(Debug, Clone)]
pub struct PostgresLogRecordRepository {
    pool: LogRecordPgPool,
}

impl PostgresLogRecordRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LogRecordPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> LogRecordRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LogRecordRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LogRecordRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(LogRecordRepositoryError::persistence)?
    }
}

#[async_trait]
impl LogRecordRepository for PostgresLogRecordRepository {
    async fn insert(&self, record: &LogRecord) -> LogRecordRepositoryResult<()> {
        let new_row = to_new_row(record);
        let fingerprint = new_row.fingerprint.clone().unwrap_or_default();
        let event_id = new_row.external_event_id.clone().unwrap_or_default();

        self.run_blocking(move |connection| {
            diesel::insert_into(log_records::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), "idx_log_records_event_id_unique") =>
                    {
                        LogRecordRepositoryError::DuplicateEventId(event_id.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        LogRecordRepositoryError::DuplicateLocalRecord(fingerprint.clone())
                    }
                    _ => LogRecordRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: RecordId) -> LogRecordRepositoryResult<Option<LogRecord>> {
        self.run_blocking(move |connection| {
            let row = log_records::table
                .filter(log_records::id.eq(id.into_inner()))
                .select(LogRecordRow::as_select())
                .first::<LogRecordRow>(connection)
                .optional()
                .map_err(LogRecordRepositoryError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn exists_local(&self, identity: &LocalIdentity) -> LogRecordRepositoryResult<bool> {
        let timestamp = identity.timestamp();
        let logger = identity.logger().to_owned();
        let message = identity.message().to_owned();
        self.run_blocking(move |connection| {
            let found = log_records::table
                .filter(log_records::source.eq(LogSource::Local.as_str()))
                .filter(log_records::timestamp.eq(timestamp))
                .filter(log_records::logger.eq(&logger))
                .filter(log_records::message.eq(&message))
                .select(log_records::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(LogRecordRepositoryError::persistence)?;
            Ok(found.is_some())
        })
        .await
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> LogRecordRepositoryResult<Option<LogRecord>> {
        let lookup = event_id.to_owned();
        self.run_blocking(move |connection| {
            let row = log_records::table
                .filter(log_records::external_event_id.eq(&lookup))
                .select(LogRecordRow::as_select())
                .first::<LogRecordRow>(connection)
                .optional()
                .map_err(LogRecordRepositoryError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn list_unanalyzed(
        &self,
        min_level: LogLevel,
        limit: usize,
    ) -> LogRecordRepositoryResult<Vec<LogRecord>> {
        let levels = levels_at_or_above(min_level);
        let row_limit = i64::try_from(limit).map_err(LogRecordRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = log_records::table
                .filter(log_records::analyzed.eq(false))
                .filter(log_records::level.eq_any(levels))
                .order(log_records::timestamp.desc())
                .limit(row_limit)
                .select(LogRecordRow::as_select())
                .load::<LogRecordRow>(connection)
                .map_err(LogRecordRepositoryError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn mark_analyzed(&self, id: RecordId) -> LogRecordRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(log_records::table.filter(log_records::id.eq(id.into_inner())))
                .set(log_records::analyzed.eq(true))
                .execute(connection)
                .map_err(LogRecordRepositoryError::persistence)?;
            if updated == 0 {
                return Err(LogRecordRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn count(&self) -> LogRecordRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let total = log_records::table
                .count()
                .get_result::<i64>(connection)
                .map_err(LogRecordRepositoryError::persistence)?;
            u64::try_from(total).map_err(LogRecordRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(record: &LogRecord) -> NewLogRecordRow {
    let fingerprint = (record.source() == LogSource::Local)
        .then(|| record.local_identity().fingerprint());
    let exception = record.exception();

    NewLogRecordRow {
        id: record.id().into_inner(),
        timestamp: record.timestamp(),
        level: record.level().as_str().to_owned(),
        logger: record.logger().to_owned(),
        message: record.message().to_owned(),
        exception_type: exception.exception_type.clone(),
        exception_value: exception.exception_value.clone(),
        stack_trace: exception.stack_trace.clone(),
        source: record.source().as_str().to_owned(),
        fingerprint,
        external_event_id: record.external_event_id().map(str::to_owned),
        remote_issue_id: record.remote_issue_id().map(str::to_owned),
        analyzed: record.is_analyzed(),
        created_at: record.created_at(),
    }
}

fn row_to_record(row: LogRecordRow) -> LogRecordRepositoryResult<LogRecord> {
    let LogRecordRow {
        id,
        timestamp,
        level,
        logger,
        message,
        exception_type,
        exception_value,
        stack_trace,
        source,
        external_event_id,
        remote_issue_id,
        analyzed,
        created_at,
        ..
    } = row;

    let data = PersistedLogRecordData {
        id: RecordId::from_uuid(id),
        timestamp,
        level: LogLevel::try_from(level.as_str()).map_err(LogRecordRepositoryError::persistence)?,
        logger,
        message,
        exception: ExceptionDetails {
            exception_type,
            exception_value,
            stack_trace,
        },
        source: LogSource::try_from(source.as_str())
            .map_err(LogRecordRepositoryError::persistence)?,
        external_event_id,
        remote_issue_id,
        analyzed,
        created_at,
    };
    Ok(LogRecord::from_persisted(data))
}

fn is_constraint(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}
