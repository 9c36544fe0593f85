//! In-memory tag repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tag::{
    domain::{Tag, TagId, TagName},
    ports::{TagRepository, TagRepositoryError, TagRepositoryResult},
};
use crate::task::domain::TaskId;

/// Thread-safe in-memory tag repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTagRepository {
    state: Arc<RwLock<InMemoryTagState>>,
}

#[derive(Debug, Default)]
struct InMemoryTagState {
    tags: HashMap<TagId, Tag>,
    name_index: HashMap<TagName, TagId>,
    links: HashSet<(TagId, TaskId)>,
}

impl InMemoryTagState {
    fn references(&self, tag_id: TagId) -> u64 {
        let total = self
            .links
            .iter()
            .filter(|(linked, _)| *linked == tag_id)
            .count();
        u64::try_from(total).unwrap_or(u64::MAX)
    }
}

impl InMemoryTagRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TagRepositoryResult<RwLockReadGuard<'_, InMemoryTagState>> {
        self.state
            .read()
            .map_err(|err| TagRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TagRepositoryResult<RwLockWriteGuard<'_, InMemoryTagState>> {
        self.state
            .write()
            .map_err(|err| TagRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn ensure(&self, candidate: &Tag) -> TagRepositoryResult<Tag> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .name_index
            .get(candidate.name())
            .and_then(|id| state.tags.get(id))
        {
            return Ok(existing.clone());
        }
        state
            .name_index
            .insert(candidate.name().clone(), candidate.id());
        state.tags.insert(candidate.id(), candidate.clone());
        Ok(candidate.clone())
    }

    async fn find_by_name(&self, name: &TagName) -> TagRepositoryResult<Option<Tag>> {
        let state = self.read()?;
        Ok(state
            .name_index
            .get(name)
            .and_then(|id| state.tags.get(id))
            .cloned())
    }

    async fn link_task(&self, tag_id: TagId, task_id: TaskId) -> TagRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tags.contains_key(&tag_id) {
            return Err(TagRepositoryError::NotFound(tag_id));
        }
        state.links.insert((tag_id, task_id));
        Ok(())
    }

    async fn refresh_usage_count(&self, tag_id: TagId) -> TagRepositoryResult<u64> {
        let mut state = self.write()?;
        let usage = state.references(tag_id);
        let tag = state
            .tags
            .get_mut(&tag_id)
            .ok_or(TagRepositoryError::NotFound(tag_id))?;
        tag.set_usage_count(usage);
        Ok(usage)
    }

    async fn count_references(&self, tag_id: TagId) -> TagRepositoryResult<u64> {
        let state = self.read()?;
        Ok(state.references(tag_id))
    }

    async fn list_unused(&self) -> TagRepositoryResult<Vec<Tag>> {
        let state = self.read()?;
        let mut unused: Vec<Tag> = state
            .tags
            .values()
            .filter(|tag| tag.usage_count() == 0)
            .cloned()
            .collect();
        unused.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(unused)
    }

    async fn delete(&self, tag_id: TagId) -> TagRepositoryResult<bool> {
        let mut state = self.write()?;
        let Some(tag) = state.tags.remove(&tag_id) else {
            return Ok(false);
        };
        state.name_index.remove(tag.name());
        state.links.retain(|(linked, _)| *linked != tag_id);
        Ok(true)
    }

    async fn count(&self) -> TagRepositoryResult<u64> {
        let state = self.read()?;
        Ok(u64::try_from(state.tags.len()).unwrap_or(u64::MAX))
    }
}
