//! `PostgreSQL` repository implementation for error analyses.

use super::{
    models::{AnalysisRow, AnalysisWriteRow},
    schema::error_analyses,
};
use crate::analysis::{
    domain::{
        AnalysisId, AnalysisStatus, Confidence, ErrorAnalysis, Judgement, PersistedAnalysisData,
        Severity,
    },
    ports::{
        AnalysisRepository, AnalysisRepositoryError, AnalysisRepositoryResult, CandidateFilter,
    },
};
use crate::log_record::domain::RecordId;
use crate::task::domain::{IssueLink, IssueRef, TaskId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed analysis repository.
#[derive(Debug, Clone)]
pub struct PostgresAnalysisRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresAnalysisRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AnalysisRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AnalysisRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AnalysisRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AnalysisRepositoryError::persistence)?
    }
}

#[async_trait]
impl AnalysisRepository for PostgresAnalysisRepository {
    async fn store(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()> {
        let row = to_write_row(analysis)?;
        let record_id = analysis.record_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(error_analyses::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AnalysisRepositoryError::DuplicateRecord(record_id)
                    }
                    _ => AnalysisRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()> {
        let row = to_write_row(analysis)?;
        let id = analysis.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(error_analyses::table.filter(error_analyses::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(AnalysisRepositoryError::persistence)?;
            if updated == 0 {
                return Err(AnalysisRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: AnalysisId) -> AnalysisRepositoryResult<Option<ErrorAnalysis>> {
        self.run_blocking(move |connection| {
            let row = error_analyses::table
                .filter(error_analyses::id.eq(id.into_inner()))
                .select(AnalysisRow::as_select())
                .first::<AnalysisRow>(connection)
                .optional()
                .map_err(AnalysisRepositoryError::persistence)?;
            row.map(row_to_analysis).transpose()
        })
        .await
    }

    async fn find_by_record(
        &self,
        record_id: RecordId,
    ) -> AnalysisRepositoryResult<Option<ErrorAnalysis>> {
        self.run_blocking(move |connection| {
            let row = error_analyses::table
                .filter(error_analyses::log_record_id.eq(record_id.into_inner()))
                .select(AnalysisRow::as_select())
                .first::<AnalysisRow>(connection)
                .optional()
                .map_err(AnalysisRepositoryError::persistence)?;
            row.map(row_to_analysis).transpose()
        })
        .await
    }

    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> AnalysisRepositoryResult<Vec<ErrorAnalysis>> {
        let severities: Vec<&'static str> = [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
        .into_iter()
        .filter(|severity| *severity >= filter.min_severity)
        .map(Severity::as_str)
        .collect();
        let min_confidence = filter.min_confidence.value();
        let row_limit = i64::try_from(filter.limit).map_err(AnalysisRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            let rows = error_analyses::table
                .filter(error_analyses::status.eq(AnalysisStatus::Pending.as_str()))
                .filter(error_analyses::is_actionable.eq(true))
                .filter(error_analyses::confidence.ge(min_confidence))
                .filter(error_analyses::severity.eq_any(severities))
                .order(error_analyses::created_at.desc())
                .limit(row_limit)
                .select(AnalysisRow::as_select())
                .load::<AnalysisRow>(connection)
                .map_err(AnalysisRepositoryError::persistence)?;
            rows.into_iter().map(row_to_analysis).collect()
        })
        .await
    }
}

fn to_write_row(analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<AnalysisWriteRow> {
    let judgement = analysis.judgement();
    let issue = analysis.issue();
    let issue_number = issue
        .map(|link| i64::try_from(link.issue_ref().issue_number().value()))
        .transpose()
        .map_err(AnalysisRepositoryError::persistence)?;

    Ok(AnalysisWriteRow {
        id: analysis.id().into_inner(),
        log_record_id: analysis.record_id().into_inner(),
        severity: judgement.severity.as_str().to_owned(),
        is_actionable: judgement.is_actionable,
        summary: judgement.summary.clone(),
        root_cause: judgement.root_cause.clone(),
        recommended_action: judgement.recommended_action.clone(),
        confidence: judgement.confidence.value(),
        status: analysis.status().as_str().to_owned(),
        approved_by: analysis.approved_by().map(str::to_owned),
        approved_at: analysis.approved_at(),
        task_id: analysis.task_id().map(TaskId::into_inner),
        issue_provider: issue.map(|link| link.issue_ref().provider().as_str().to_owned()),
        issue_repository: issue.map(|link| link.issue_ref().repository().to_string()),
        issue_number,
        issue_url: issue.map(|link| link.url().to_owned()),
        issue_synced_at: issue.map(IssueLink::synced_at),
        created_at: analysis.created_at(),
        updated_at: analysis.updated_at(),
    })
}

fn row_to_analysis(row: AnalysisRow) -> AnalysisRepositoryResult<ErrorAnalysis> {
    let issue = match (
        row.issue_provider,
        row.issue_repository,
        row.issue_number,
        row.issue_url,
        row.issue_synced_at,
    ) {
        (Some(provider), Some(repository), Some(raw_number), Some(url), Some(synced_at)) => {
            let number = u64::try_from(raw_number).map_err(AnalysisRepositoryError::persistence)?;
            let issue_ref = IssueRef::from_parts(&provider, &repository, number)
                .map_err(AnalysisRepositoryError::persistence)?;
            Some(IssueLink::new(issue_ref, url, synced_at))
        }
        _ => None,
    };

    let judgement = Judgement {
        severity: Severity::try_from(row.severity.as_str())
            .map_err(AnalysisRepositoryError::persistence)?,
        is_actionable: row.is_actionable,
        summary: row.summary,
        root_cause: row.root_cause,
        recommended_action: row.recommended_action,
        confidence: Confidence::new(row.confidence)
            .map_err(AnalysisRepositoryError::persistence)?,
    };

    Ok(ErrorAnalysis::from_persisted(PersistedAnalysisData {
        id: AnalysisId::from_uuid(row.id),
        record_id: RecordId::from_uuid(row.log_record_id),
        judgement,
        status: AnalysisStatus::try_from(row.status.as_str())
            .map_err(AnalysisRepositoryError::persistence)?,
        approved_by: row.approved_by,
        approved_at: row.approved_at,
        task_id: row.task_id.map(TaskId::from_uuid),
        issue,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
