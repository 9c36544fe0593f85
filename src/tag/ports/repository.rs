//! Repository port for tags and task-tag relationships.

use crate::tag::domain::{Tag, TagId, TagName};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tag repository operations.
pub type TagRepositoryResult<T> = Result<T, TagRepositoryError>;

/// Tag persistence contract.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Returns the stored tag named like `candidate`, storing `candidate`
    /// first when no such tag exists.
    async fn ensure(&self, candidate: &Tag) -> TagRepositoryResult<Tag>;

    /// Finds a tag by name.
    async fn find_by_name(&self, name: &TagName) -> TagRepositoryResult<Option<Tag>>;

    /// Records that `task_id` carries `tag_id`. Linking twice is a no-op.
    ///
    /// The cached usage counter is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TagRepositoryError::NotFound`] when the tag does not exist.
    async fn link_task(&self, tag_id: TagId, task_id: TaskId) -> TagRepositoryResult<()>;

    /// Recomputes and stores the cached usage counter, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`TagRepositoryError::NotFound`] when the tag does not exist.
    async fn refresh_usage_count(&self, tag_id: TagId) -> TagRepositoryResult<u64>;

    /// Counts task relationships for a tag without touching the cache.
    async fn count_references(&self, tag_id: TagId) -> TagRepositoryResult<u64>;

    /// Lists tags whose cached usage counter is zero, ordered by name.
    async fn list_unused(&self) -> TagRepositoryResult<Vec<Tag>>;

    /// Deletes a tag. Returns `false` when it did not exist.
    async fn delete(&self, tag_id: TagId) -> TagRepositoryResult<bool>;

    /// Returns the number of stored tags.
    async fn count(&self) -> TagRepositoryResult<u64>;
}

/// Errors returned by tag repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TagRepositoryError {
    /// The tag was not found.
    #[error("tag not found: {0}")]
    NotFound(TagId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TagRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
