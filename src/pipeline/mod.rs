//! End-to-end triage runs.
//!
//! A run collects records from the local log directory and the remote
//! tracker, persists them, classifies unanalysed records and materialises
//! qualifying analyses into tasks. Each stage can be switched off. Failures
//! that are part of normal operation, such as an unreachable tracker or a
//! missing log directory, are reported in the [`PipelineSummary`] and the run
//! carries on with the next stage.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{
    domain::{Confidence, Severity},
    ports::{AnalysisRepository, ReasoningProvider},
    services::{ClassifierError, ClassifierService, ClassifyReport},
};
use crate::config::SentryConfig;
use crate::log_record::{
    adapters::local::{LocalLogScanner, ScanFilter},
    domain::{LogLevel, LogRecord},
    ports::{IssueQuery, LogRecordRepository, RemoteIssueSource},
    services::{IngestReport, IngestService, RemoteFetchService},
};
use crate::tag::ports::TagRepository;
use crate::task::{
    ports::{IssueTracker, TaskRepository},
    services::{MaterializeError, MaterializePolicy, MaterializeReport, MaterializerService},
};

/// Pipeline stages that can be switched on individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSelection {
    /// Scan the local log directory.
    pub fetch_local: bool,
    /// Fetch events from the remote tracker.
    pub fetch_remote: bool,
    /// Classify unanalysed records.
    pub analyze: bool,
    /// Materialise qualifying analyses into tasks.
    pub create_tasks: bool,
}

impl StageSelection {
    /// Selects every stage.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            fetch_local: true,
            fetch_remote: true,
            analyze: true,
            create_tasks: true,
        }
    }

    /// Returns `true` when no stage is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.fetch_local || self.fetch_remote || self.analyze || self.create_tasks)
    }
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Look-back window in hours.
    pub lookback_hours: u32,
    /// Lowest level collected locally and classified.
    pub min_level: LogLevel,
    /// Lowest severity materialised automatically.
    pub min_severity: Severity,
    /// Lowest confidence materialised automatically.
    pub min_confidence: Confidence,
    /// Batch size for classification and materialisation.
    pub limit: usize,
    /// Stages to run.
    pub stages: StageSelection,
    /// File external issues for high and critical tasks.
    pub escalate_issues: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            min_level: LogLevel::Warning,
            min_severity: Severity::Medium,
            min_confidence: Confidence::from_percent(70),
            limit: 50,
            stages: StageSelection::all(),
            escalate_issues: false,
        }
    }
}

impl PipelineOptions {
    /// Returns the materialisation policy for these options.
    #[must_use]
    pub const fn policy(&self) -> MaterializePolicy {
        MaterializePolicy {
            min_severity: self.min_severity,
            min_confidence: self.min_confidence,
            limit: self.limit,
            escalate_issues: self.escalate_issues,
        }
    }
}

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Local log scan.
    FetchLocal,
    /// Remote tracker fetch.
    FetchRemote,
    /// Classification.
    Analyze,
    /// Task materialisation.
    CreateTasks,
}

impl Stage {
    /// Returns the stage name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchLocal => "fetch-local",
            Self::FetchRemote => "fetch-remote",
            Self::Analyze => "analyze",
            Self::CreateTasks => "create-tasks",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage that could not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Affected stage.
    pub stage: Stage,
    /// Human-readable cause.
    pub reason: String,
}

/// Results of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Records accepted by the local scan.
    pub local_records: usize,
    /// Records normalised from remote events.
    pub remote_records: usize,
    /// Persistence counters for the collected records.
    pub ingest: IngestReport,
    /// Classification counters, when the stage ran.
    pub classification: Option<ClassifyReport>,
    /// Materialisation counters, when the stage ran.
    pub materialization: Option<MaterializeReport>,
    /// Stages that could not run.
    pub failures: Vec<StageFailure>,
}

impl PipelineSummary {
    fn record_failure(&mut self, stage: Stage, reason: impl Into<String>) {
        let failure = StageFailure {
            stage,
            reason: reason.into(),
        };
        warn!(stage = %failure.stage, reason = %failure.reason, "pipeline stage failed");
        self.failures.push(failure);
    }
}

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Classification candidates could not be listed.
    #[error(transparent)]
    Classification(#[from] ClassifierError),

    /// Materialisation candidates could not be listed.
    #[error(transparent)]
    Materialization(#[from] MaterializeError),
}

struct RemoteStage<C>
where
    C: Clock + Send + Sync,
{
    service: RemoteFetchService<C>,
    query: String,
    issue_limit: usize,
    events_per_issue: usize,
}

/// Runs the triage stages against a set of repositories.
pub struct TriagePipeline<L, A, T, G, C>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    T: TaskRepository,
    G: TagRepository,
    C: Clock + Send + Sync + 'static,
{
    records: Arc<L>,
    analyses: Arc<A>,
    ingest: IngestService<L>,
    scanner: Option<LocalLogScanner>,
    remote: Option<RemoteStage<C>>,
    classifier: Option<ClassifierService<L, A, C>>,
    materializer: MaterializerService<A, L, T, G, C>,
    clock: Arc<C>,
}

impl<L, A, T, G, C> TriagePipeline<L, A, T, G, C>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    T: TaskRepository,
    G: TagRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a pipeline with persistence and materialisation only.
    ///
    /// Collection and classification stages report a failure until their
    /// collaborators are attached.
    #[must_use]
    pub fn new(
        records: Arc<L>,
        analyses: Arc<A>,
        tasks: Arc<T>,
        tags: Arc<G>,
        clock: Arc<C>,
    ) -> Self {
        let materializer = MaterializerService::new(
            Arc::clone(&analyses),
            Arc::clone(&records),
            tasks,
            tags,
            Arc::clone(&clock),
        );
        Self {
            ingest: IngestService::new(Arc::clone(&records)),
            records,
            analyses,
            scanner: None,
            remote: None,
            classifier: None,
            materializer,
            clock,
        }
    }

    /// Attaches the local log scanner.
    #[must_use]
    pub fn with_scanner(mut self, scanner: LocalLogScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Attaches the remote tracker with its query settings.
    #[must_use]
    pub fn with_remote(mut self, source: Arc<dyn RemoteIssueSource>, settings: &SentryConfig) -> Self {
        self.remote = Some(RemoteStage {
            service: RemoteFetchService::new(source, Arc::clone(&self.clock)),
            query: settings.query.clone(),
            issue_limit: settings.issue_limit,
            events_per_issue: settings.events_per_issue,
        });
        self
    }

    /// Attaches the reasoning provider used for classification.
    #[must_use]
    pub fn with_reasoning(mut self, provider: Arc<dyn ReasoningProvider>) -> Self {
        self.classifier = Some(ClassifierService::new(
            Arc::clone(&self.records),
            Arc::clone(&self.analyses),
            provider,
            Arc::clone(&self.clock),
        ));
        self
    }

    /// Attaches the issue tracker used for escalation.
    #[must_use]
    pub fn with_issue_tracker(mut self, issue_tracker: Arc<dyn IssueTracker>) -> Self {
        self.materializer = self.materializer.with_issue_tracker(issue_tracker);
        self
    }

    /// Returns the materialiser, for manual approval.
    #[must_use]
    pub const fn materializer(&self) -> &MaterializerService<A, L, T, G, C> {
        &self.materializer
    }

    /// Checks that the remote tracker is reachable.
    ///
    /// Returns `false` when no tracker is attached.
    pub async fn test_remote(&self) -> bool {
        let Some(remote) = self.remote.as_ref() else {
            return false;
        };
        remote.service.test_connection().await
    }

    /// Runs the selected stages in order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when a repository fails while listing
    /// classification or materialisation candidates.
    pub async fn run(&self, options: &PipelineOptions) -> Result<PipelineSummary, PipelineError> {
        let mut summary = PipelineSummary::default();
        let since = self.cutoff(options.lookback_hours);
        let mut collected = Vec::new();

        if options.stages.fetch_local {
            match self.scan_local(options.min_level, since).await {
                Ok(records) => {
                    summary.local_records = records.len();
                    collected.extend(records);
                }
                Err(reason) => summary.record_failure(Stage::FetchLocal, reason),
            }
        }

        if options.stages.fetch_remote {
            match self.fetch_remote(options.lookback_hours).await {
                Ok(records) => {
                    summary.remote_records = records.len();
                    collected.extend(records);
                }
                Err(reason) => summary.record_failure(Stage::FetchRemote, reason),
            }
        }

        if !collected.is_empty() {
            summary.ingest = self.ingest.persist(collected).await;
        }

        if options.stages.analyze {
            summary.classification = self.classify(options).await?;
            if summary.classification.is_none() {
                summary.record_failure(Stage::Analyze, "no reasoning provider configured");
            }
        }

        if options.stages.create_tasks {
            let report = self.materializer.materialize_batch(&options.policy()).await?;
            summary.materialization = Some(report);
        }

        info!(
            local_records = summary.local_records,
            remote_records = summary.remote_records,
            inserted = summary.ingest.inserted,
            failures = summary.failures.len(),
            "pipeline run finished"
        );
        Ok(summary)
    }

    fn cutoff(&self, lookback_hours: u32) -> DateTime<Utc> {
        let now = self.clock.utc();
        now.checked_sub_signed(TimeDelta::hours(i64::from(lookback_hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    async fn classify(
        &self,
        options: &PipelineOptions,
    ) -> Result<Option<ClassifyReport>, ClassifierError> {
        let Some(classifier) = self.classifier.as_ref() else {
            return Ok(None);
        };
        let report = classifier
            .classify_batch(options.min_level, options.limit)
            .await?;
        Ok(Some(report))
    }

    async fn scan_local(
        &self,
        min_level: LogLevel,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogRecord>, String> {
        let scanner = self
            .scanner
            .clone()
            .ok_or_else(|| "local log scanning is not configured".to_owned())?;
        let clock = Arc::clone(&self.clock);
        let filter = ScanFilter { min_level, since };

        let outcome = tokio::task::spawn_blocking(move || scanner.scan(&filter, clock.as_ref()))
            .await
            .map_err(|err| err.to_string())?
            .map_err(|err| err.to_string())?;
        Ok(outcome.records)
    }

    async fn fetch_remote(&self, lookback_hours: u32) -> Result<Vec<LogRecord>, String> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| "remote tracker is not configured".to_owned())?;
        let query = IssueQuery {
            query: remote.query.clone(),
            lookback_hours,
            limit: remote.issue_limit,
        };
        let outcome = remote
            .service
            .fetch(&query, remote.events_per_issue)
            .await
            .map_err(|err| err.to_string())?;
        Ok(outcome.records)
    }
}
