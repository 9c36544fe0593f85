//! Shared world state for error triage BDD scenarios.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use faultline::analysis::{
    adapters::memory::InMemoryAnalysisRepository,
    ports::{ReasoningProvider, ReasoningRequest, ReasoningResult},
};
use faultline::config::LocalLogConfig;
use faultline::log_record::adapters::{
    local::LocalLogScanner, memory::InMemoryLogRecordRepository,
};
use faultline::pipeline::TriagePipeline;
use faultline::tag::{adapters::memory::InMemoryTagRepository, services::CleanupReport};
use faultline::task::{adapters::memory::InMemoryTaskRepository, services::MaterializeOutcome};
use mockable::DefaultClock;
use rstest::fixture;
use tempfile::TempDir;

/// Pipeline type used by the BDD world.
pub type TestPipeline = TriagePipeline<
    InMemoryLogRecordRepository,
    InMemoryAnalysisRepository,
    InMemoryTaskRepository,
    InMemoryTagRepository,
    DefaultClock,
>;

/// Provider answering every prompt with a fixed reply.
pub struct FixedReply(pub String);

#[async_trait]
impl ReasoningProvider for FixedReply {
    async fn complete(&self, _request: &ReasoningRequest) -> ReasoningResult<String> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Scenario world for error triage behaviour tests.
pub struct TriageWorld {
    pub log_dir: TempDir,
    pub records: Arc<InMemoryLogRecordRepository>,
    pub analyses: Arc<InMemoryAnalysisRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub tags: Arc<InMemoryTagRepository>,
    pub provider: Option<Arc<dyn ReasoningProvider>>,
    pub last_outcome: Option<MaterializeOutcome>,
    pub last_cleanup: Option<CleanupReport>,
}

impl TriageWorld {
    /// Creates a world with empty stores and an empty log directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_dir: TempDir::new().expect("temp dir"),
            records: Arc::new(InMemoryLogRecordRepository::new()),
            analyses: Arc::new(InMemoryAnalysisRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            tags: Arc::new(InMemoryTagRepository::new()),
            provider: None,
            last_outcome: None,
            last_cleanup: None,
        }
    }

    /// Writes a log file into the scenario directory.
    pub fn write_log(&self, contents: &str) -> Result<(), eyre::Report> {
        fs::write(self.log_dir.path().join("service.log"), contents)?;
        Ok(())
    }

    /// Builds a pipeline over the world's stores.
    pub fn pipeline(&self) -> Result<TestPipeline, eyre::Report> {
        let directory = Utf8PathBuf::from_path_buf(self.log_dir.path().to_path_buf())
            .map_err(|path| eyre::eyre!("non utf-8 temp directory {}", path.display()))?;
        let scanner = LocalLogScanner::new(&LocalLogConfig {
            directory,
            file_pattern: "*.log".to_owned(),
        })?;
        let pipeline = TriagePipeline::new(
            Arc::clone(&self.records),
            Arc::clone(&self.analyses),
            Arc::clone(&self.tasks),
            Arc::clone(&self.tags),
            Arc::new(DefaultClock),
        )
        .with_scanner(scanner);

        let Some(provider) = self.provider.as_ref() else {
            return Ok(pipeline);
        };
        Ok(pipeline.with_reasoning(Arc::clone(provider)))
    }
}

impl Default for TriageWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TriageWorld {
    TriageWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
