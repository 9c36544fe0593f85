//! Diesel row models for log record persistence.

use super::schema::log_records;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for log records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = log_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LogRecordRow {
    /// Internal record identifier.
    pub id: uuid::Uuid,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Uppercase level name.
    pub level: String,
    /// Emitting logger name.
    pub logger: String,
    /// Message text.
    pub message: String,
    /// Exception type.
    pub exception_type: String,
    /// Exception value.
    pub exception_value: String,
    /// Stack trace.
    pub stack_trace: String,
    /// Collection source.
    pub source: String,
    /// Natural-identity digest for local records.
    pub fingerprint: Option<String>,
    /// Remote tracker event identifier.
    pub external_event_id: Option<String>,
    /// Remote tracker issue identifier.
    pub remote_issue_id: Option<String>,
    /// Whether the record has been classified.
    pub analyzed: bool,
    /// Ingestion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for log records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = log_records)]
pub struct NewLogRecordRow {
    /// Internal record identifier.
    pub id: uuid::Uuid,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Uppercase level name.
    pub level: String,
    /// Emitting logger name.
    pub logger: String,
    /// Message text.
    pub message: String,
    /// Exception type.
    pub exception_type: String,
    /// Exception value.
    pub exception_value: String,
    /// Stack trace.
    pub stack_trace: String,
    /// Collection source.
    pub source: String,
    /// Natural-identity digest for local records.
    pub fingerprint: Option<String>,
    /// Remote tracker event identifier.
    pub external_event_id: Option<String>,
    /// Remote tracker issue identifier.
    pub remote_issue_id: Option<String>,
    /// Whether the record has been classified.
    pub analyzed: bool,
    /// Ingestion timestamp.
    pub created_at: DateTime<Utc>,
}
