//! `PostgreSQL` repository implementation for tags.

use super::{
    models::{TagRow, TaskTagRow},
    schema::{tags, task_tags},
};
use crate::tag::{
    domain::{Tag, TagId, TagName},
    ports::{TagRepository, TagRepositoryError, TagRepositoryResult},
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL`-backed tag repository.
#[derive(Debug, Clone)]
pub struct PostgresTagRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresTagRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TagRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TagRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TagRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TagRepositoryError::persistence)?
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn ensure(&self, candidate: &Tag) -> TagRepositoryResult<Tag> {
        let row = to_row(candidate)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(tags::table)
                .values(&row)
                .on_conflict(tags::name)
                .do_nothing()
                .execute(connection)
                .map_err(TagRepositoryError::persistence)?;
            let stored = tags::table
                .filter(tags::name.eq(&row.name))
                .select(TagRow::as_select())
                .first::<TagRow>(connection)
                .map_err(TagRepositoryError::persistence)?;
            row_to_tag(stored)
        })
        .await
    }

    async fn find_by_name(&self, name: &TagName) -> TagRepositoryResult<Option<Tag>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = tags::table
                .filter(tags::name.eq(&lookup))
                .select(TagRow::as_select())
                .first::<TagRow>(connection)
                .optional()
                .map_err(TagRepositoryError::persistence)?;
            row.map(row_to_tag).transpose()
        })
        .await
    }

    async fn link_task(&self, tag_id: TagId, task_id: TaskId) -> TagRepositoryResult<()> {
        let link = TaskTagRow {
            task_id: task_id.into_inner(),
            tag_id: tag_id.into_inner(),
        };
        self.run_blocking(move |connection| {
            let exists = tags::table
                .filter(tags::id.eq(link.tag_id))
                .select(tags::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(TagRepositoryError::persistence)?;
            if exists.is_none() {
                return Err(TagRepositoryError::NotFound(tag_id));
            }
            diesel::insert_into(task_tags::table)
                .values(&link)
                .on_conflict((task_tags::task_id, task_tags::tag_id))
                .do_nothing()
                .execute(connection)
                .map_err(TagRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn refresh_usage_count(&self, tag_id: TagId) -> TagRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let usage = count_links(connection, tag_id)?;
            let updated = diesel::update(tags::table.filter(tags::id.eq(tag_id.into_inner())))
                .set(tags::usage_count.eq(usage))
                .execute(connection)
                .map_err(TagRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TagRepositoryError::NotFound(tag_id));
            }
            u64::try_from(usage).map_err(TagRepositoryError::persistence)
        })
        .await
    }

    async fn count_references(&self, tag_id: TagId) -> TagRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let usage = count_links(connection, tag_id)?;
            u64::try_from(usage).map_err(TagRepositoryError::persistence)
        })
        .await
    }

    async fn list_unused(&self) -> TagRepositoryResult<Vec<Tag>> {
        self.run_blocking(move |connection| {
            let rows = tags::table
                .filter(tags::usage_count.eq(0))
                .order(tags::name.asc())
                .select(TagRow::as_select())
                .load::<TagRow>(connection)
                .map_err(TagRepositoryError::persistence)?;
            rows.into_iter().map(row_to_tag).collect()
        })
        .await
    }

    async fn delete(&self, tag_id: TagId) -> TagRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            // task_tags rows follow through ON DELETE CASCADE.
            let deleted = diesel::delete(tags::table.filter(tags::id.eq(tag_id.into_inner())))
                .execute(connection)
                .map_err(TagRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn count(&self) -> TagRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let total = tags::table
                .count()
                .get_result::<i64>(connection)
                .map_err(TagRepositoryError::persistence)?;
            u64::try_from(total).map_err(TagRepositoryError::persistence)
        })
        .await
    }
}

fn count_links(connection: &mut PgConnection, tag_id: TagId) -> TagRepositoryResult<i64> {
    task_tags::table
        .filter(task_tags::tag_id.eq(tag_id.into_inner()))
        .count()
        .get_result::<i64>(connection)
        .map_err(TagRepositoryError::persistence)
}

fn to_row(tag: &Tag) -> TagRepositoryResult<TagRow> {
    Ok(TagRow {
        id: tag.id().into_inner(),
        name: tag.name().as_str().to_owned(),
        usage_count: i64::try_from(tag.usage_count()).map_err(TagRepositoryError::persistence)?,
        created_at: tag.created_at(),
    })
}

fn row_to_tag(row: TagRow) -> TagRepositoryResult<Tag> {
    Ok(Tag::from_persisted(
        TagId::from_uuid(row.id),
        TagName::new(row.name).map_err(TagRepositoryError::persistence)?,
        u64::try_from(row.usage_count).map_err(TagRepositoryError::persistence)?,
        row.created_at,
    ))
}
