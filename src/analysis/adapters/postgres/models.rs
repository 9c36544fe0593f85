//! Diesel row models for analysis persistence.

use super::schema::error_analyses;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for error analyses.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = error_analyses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnalysisRow {
    /// Internal analysis identifier.
    pub id: uuid::Uuid,
    /// Analysed log record.
    pub log_record_id: uuid::Uuid,
    /// Severity name.
    pub severity: String,
    /// Whether the finding is actionable.
    pub is_actionable: bool,
    /// Summary text.
    pub summary: String,
    /// Root cause text.
    pub root_cause: String,
    /// Recommended action text.
    pub recommended_action: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Lifecycle status.
    pub status: String,
    /// Approving actor.
    pub approved_by: Option<String>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Materialised task.
    pub task_id: Option<uuid::Uuid>,
    /// Issue provider.
    pub issue_provider: Option<String>,
    /// Issue repository.
    pub issue_repository: Option<String>,
    /// Issue number.
    pub issue_number: Option<i64>,
    /// Issue URL.
    pub issue_url: Option<String>,
    /// Issue synchronisation timestamp.
    pub issue_synced_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for error analyses.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = error_analyses)]
#[diesel(treat_none_as_null = true)]
pub struct AnalysisWriteRow {
    /// Internal analysis identifier.
    pub id: uuid::Uuid,
    /// Analysed log record.
    pub log_record_id: uuid::Uuid,
    /// Severity name.
    pub severity: String,
    /// Whether the finding is actionable.
    pub is_actionable: bool,
    /// Summary text.
    pub summary: String,
    /// Root cause text.
    pub root_cause: String,
    /// Recommended action text.
    pub recommended_action: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Lifecycle status.
    pub status: String,
    /// Approving actor.
    pub approved_by: Option<String>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Materialised task.
    pub task_id: Option<uuid::Uuid>,
    /// Issue provider.
    pub issue_provider: Option<String>,
    /// Issue repository.
    pub issue_repository: Option<String>,
    /// Issue number.
    pub issue_number: Option<i64>,
    /// Issue URL.
    pub issue_url: Option<String>,
    /// Issue synchronisation timestamp.
    pub issue_synced_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}
