//! Shared fixtures for in-memory triage integration tests.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use camino::Utf8PathBuf;
use chrono::{TimeDelta, Utc};
use faultline::analysis::{
    adapters::memory::InMemoryAnalysisRepository,
    ports::{ReasoningProvider, ReasoningRequest, ReasoningResult},
};
use faultline::config::LocalLogConfig;
use faultline::log_record::adapters::{
    local::LocalLogScanner, memory::InMemoryLogRecordRepository,
};
use faultline::pipeline::{PipelineOptions, StageSelection, TriagePipeline};
use faultline::tag::adapters::memory::InMemoryTagRepository;
use faultline::task::adapters::memory::InMemoryTaskRepository;
use mockable::DefaultClock;
use tempfile::TempDir;

/// Pipeline wired to in-memory stores.
pub type TestPipeline = TriagePipeline<
    InMemoryLogRecordRepository,
    InMemoryAnalysisRepository,
    InMemoryTaskRepository,
    InMemoryTagRepository,
    DefaultClock,
>;

/// Reasoning provider that answers every prompt with the same reply.
pub struct ScriptedProvider {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    /// Creates a provider replying with a judgement of `severity` and
    /// `confidence`.
    pub fn rating(severity: &str, confidence: &str) -> Self {
        Self {
            reply: format!(
                "```json\n{{\"severity\": \"{severity}\", \"is_actionable\": true, \
                 \"summary\": \"Checkout is failing\", \"root_cause\": \"Missing order key\", \
                 \"recommended_action\": \"Validate the payload\", \"confidence\": {confidence}}}\n```"
            ),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    async fn complete(&self, _request: &ReasoningRequest) -> ReasoningResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// In-memory stores shared between a pipeline and assertions.
pub struct Stores {
    pub records: Arc<InMemoryLogRecordRepository>,
    pub analyses: Arc<InMemoryAnalysisRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub tags: Arc<InMemoryTagRepository>,
}

impl Stores {
    /// Creates empty stores.
    pub fn new() -> Self {
        Self {
            records: Arc::new(InMemoryLogRecordRepository::new()),
            analyses: Arc::new(InMemoryAnalysisRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            tags: Arc::new(InMemoryTagRepository::new()),
        }
    }

    /// Builds a pipeline reading `dir` over these stores.
    pub fn pipeline(&self, dir: &TempDir) -> TestPipeline {
        let directory =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp directory");
        let scanner = LocalLogScanner::new(&LocalLogConfig {
            directory,
            file_pattern: "*.log*".to_owned(),
        })
        .expect("valid pattern");

        TriagePipeline::new(
            Arc::clone(&self.records),
            Arc::clone(&self.analyses),
            Arc::clone(&self.tasks),
            Arc::clone(&self.tags),
            Arc::new(DefaultClock),
        )
        .with_scanner(scanner)
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `service.log` with an error followed by its exception block, a warning, and
/// an info line, all stamped within the last hour.
pub fn recent_log_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let stamp = |minutes: i64| {
        (Utc::now() - TimeDelta::minutes(minutes))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    };
    let contents = format!(
        "{info} [INFO] [shop.http] - GET /health 200\n\
         {warning} [WARNING] [shop.cache] - cache miss ratio above 40%\n\
         {error} [ERROR] [shop.orders] - checkout failed - order rejected\n\
         KeyError: 'order_id'\n  \
         File \"orders.py\", line 88, in checkout\n  \
         File \"cart.py\", line 12, in lookup\n",
        info = stamp(50),
        warning = stamp(40),
        error = stamp(30),
    );
    fs::write(dir.path().join("service.log"), contents).expect("write log file");
    dir
}

/// Options that skip the remote stage.
pub fn local_only() -> PipelineOptions {
    PipelineOptions {
        stages: StageSelection {
            fetch_remote: false,
            ..StageSelection::all()
        },
        ..PipelineOptions::default()
    }
}
