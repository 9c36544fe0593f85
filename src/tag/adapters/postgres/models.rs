//! Diesel row models for tags.

use super::schema::{tags, task_tags};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for tags.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TagRow {
    /// Internal tag identifier.
    pub id: uuid::Uuid,
    /// Normalised tag name.
    pub name: String,
    /// Cached usage counter.
    pub usage_count: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert row for task-tag relationships.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = task_tags)]
pub struct TaskTagRow {
    /// Tagged task.
    pub task_id: uuid::Uuid,
    /// Applied tag.
    pub tag_id: uuid::Uuid,
}
