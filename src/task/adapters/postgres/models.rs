//! Diesel row models for work item persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Work item status.
    pub status: String,
    /// Tag names as a JSON array.
    pub tags: Value,
    /// Assignee.
    pub assignee: Option<String>,
    /// Linked issue payload.
    pub issue: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for tasks.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskWriteRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Work item status.
    pub status: String,
    /// Tag names as a JSON array.
    pub tags: Value,
    /// Assignee.
    pub assignee: Option<String>,
    /// Linked issue payload.
    pub issue: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
