//! In-memory repository for error analyses.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::analysis::{
    domain::{AnalysisId, AnalysisStatus, ErrorAnalysis},
    ports::{
        AnalysisRepository, AnalysisRepositoryError, AnalysisRepositoryResult, CandidateFilter,
    },
};
use crate::log_record::domain::RecordId;

/// Thread-safe in-memory analysis repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnalysisRepository {
    state: Arc<RwLock<InMemoryAnalysisState>>,
}

#[derive(Debug, Default)]
struct InMemoryAnalysisState {
    analyses: HashMap<AnalysisId, ErrorAnalysis>,
    record_index: HashMap<RecordId, AnalysisId>,
}

impl InMemoryAnalysisRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AnalysisRepositoryResult<RwLockReadGuard<'_, InMemoryAnalysisState>> {
        self.state.read().map_err(|err| {
            AnalysisRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> AnalysisRepositoryResult<RwLockWriteGuard<'_, InMemoryAnalysisState>> {
        self.state.write().map_err(|err| {
            AnalysisRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    async fn store(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()> {
        let mut state = self.write()?;
        if state.record_index.contains_key(&analysis.record_id()) {
            return Err(AnalysisRepositoryError::DuplicateRecord(
                analysis.record_id(),
            ));
        }
        state
            .record_index
            .insert(analysis.record_id(), analysis.id());
        state.analyses.insert(analysis.id(), analysis.clone());
        Ok(())
    }

    async fn update(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .analyses
            .get_mut(&analysis.id())
            .ok_or(AnalysisRepositoryError::NotFound(analysis.id()))?;
        *slot = analysis.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: AnalysisId) -> AnalysisRepositoryResult<Option<ErrorAnalysis>> {
        let state = self.read()?;
        Ok(state.analyses.get(&id).cloned())
    }

    async fn find_by_record(
        &self,
        record_id: RecordId,
    ) -> AnalysisRepositoryResult<Option<ErrorAnalysis>> {
        let state = self.read()?;
        Ok(state
            .record_index
            .get(&record_id)
            .and_then(|id| state.analyses.get(id))
            .cloned())
    }

    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> AnalysisRepositoryResult<Vec<ErrorAnalysis>> {
        let state = self.read()?;
        let mut candidates: Vec<ErrorAnalysis> = state
            .analyses
            .values()
            .filter(|analysis| {
                let judgement = analysis.judgement();
                analysis.status() == AnalysisStatus::Pending
                    && judgement.is_actionable
                    && judgement.confidence >= filter.min_confidence
                    && judgement.severity >= filter.min_severity
            })
            .cloned()
            .collect();
        candidates.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        candidates.truncate(filter.limit);
        Ok(candidates)
    }
}
