//! Command line entry point.
//!
//! ```text
//! faultline [--config PATH] [--in-memory] [--verbose] <command>
//! ```
//!
//! Commands:
//!
//! - `run`: collect, classify and materialise in one pass
//! - `approve <analysis-id> --actor <name>`: approve an analysis and create
//!   its task
//! - `test-remote`: probe the remote tracker credentials
//! - `cleanup-tags`: delete tags no task references
//!
//! Summaries go to stdout and diagnostics to stderr. Per-item failures are
//! reported without changing the exit code.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use faultline::analysis::{
    adapters::{
        memory::InMemoryAnalysisRepository, postgres::PostgresAnalysisRepository,
        reasoning::provider_from_config,
    },
    domain::{AnalysisId, Confidence, Severity},
    ports::AnalysisRepository,
};
use faultline::config::{DATABASE_URL_ENV, DatabaseConfig, FaultlineConfig};
use faultline::log_record::{
    adapters::{
        local::LocalLogScanner, memory::InMemoryLogRecordRepository,
        postgres::PostgresLogRecordRepository, sentry::SentryClient,
    },
    domain::LogLevel,
    ports::LogRecordRepository,
};
use faultline::pipeline::{PipelineOptions, PipelineSummary, StageSelection, TriagePipeline};
use faultline::tag::{
    adapters::{memory::InMemoryTagRepository, postgres::PostgresTagRepository},
    domain::TagName,
    ports::TagRepository,
    services::{CleanupReport, CleanupRequest, TagCleanupService},
};
use faultline::task::{
    adapters::{
        github::GitHubIssueTracker, memory::InMemoryTaskRepository,
        postgres::PostgresTaskRepository,
    },
    ports::TaskRepository,
    services::{MaterializeOutcome, MaterializePolicy},
};

/// Log triage: ingest errors, classify them and create tasks.
#[derive(Debug, Parser)]
#[command(name = "faultline", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Keep all state in memory instead of `PostgreSQL`.
    #[arg(long, global = true, default_value_t = false)]
    in_memory: bool,

    /// Log at debug level and list every tag considered by cleanup.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the triage pipeline.
    Run(RunArgs),
    /// Approve an analysis and create its task.
    Approve(ApproveArgs),
    /// Check the remote tracker connection.
    TestRemote,
    /// Delete tags that no task references.
    CleanupTags(CleanupArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Run every stage. Implied when no stage is selected.
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Scan local log files.
    #[arg(long, default_value_t = false)]
    fetch_local: bool,

    /// Fetch events from the remote tracker.
    #[arg(long, default_value_t = false)]
    fetch_remote: bool,

    /// Classify unanalysed records.
    #[arg(long, default_value_t = false)]
    analyze: bool,

    /// Create tasks from qualifying analyses.
    #[arg(long, default_value_t = false)]
    create_tasks: bool,

    /// Look-back window in hours.
    #[arg(long, default_value_t = 24)]
    hours: u32,

    /// Lowest log level collected and classified.
    #[arg(long, default_value = "WARNING")]
    min_level: LogLevel,

    /// Lowest severity turned into a task.
    #[arg(long, default_value = "medium")]
    min_severity: Severity,

    /// Lowest confidence turned into a task.
    #[arg(long, default_value_t = 0.7)]
    min_confidence: f64,

    /// Batch size for classification and task creation.
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// File issues for high and critical tasks.
    #[arg(long, default_value_t = false)]
    escalate_issues: bool,
}

impl RunArgs {
    fn options(&self) -> eyre::Result<PipelineOptions> {
        let selected = StageSelection {
            fetch_local: self.fetch_local,
            fetch_remote: self.fetch_remote,
            analyze: self.analyze,
            create_tasks: self.create_tasks,
        };
        let stages = if self.all || selected.is_empty() {
            StageSelection::all()
        } else {
            selected
        };
        Ok(PipelineOptions {
            lookback_hours: self.hours,
            min_level: self.min_level,
            min_severity: self.min_severity,
            min_confidence: Confidence::new(self.min_confidence)?,
            limit: self.limit,
            stages,
            escalate_issues: self.escalate_issues,
        })
    }
}

#[derive(Debug, Args)]
struct ApproveArgs {
    /// Analysis identifier.
    analysis_id: AnalysisId,

    /// Name recorded as approver and task assignee.
    #[arg(long)]
    actor: String,

    /// File an issue when the analysis is high or critical.
    #[arg(long, default_value_t = false)]
    escalate_issues: bool,
}

#[derive(Debug, Args)]
struct CleanupArgs {
    /// Report what would be deleted without deleting anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Skip the interactive confirmation.
    #[arg(long, default_value_t = false)]
    yes: bool,
}

struct Stores<L, A, T, G> {
    records: Arc<L>,
    analyses: Arc<A>,
    tasks: Arc<T>,
    tags: Arc<G>,
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    if cli.in_memory {
        let stores = Stores {
            records: Arc::new(InMemoryLogRecordRepository::new()),
            analyses: Arc::new(InMemoryAnalysisRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            tags: Arc::new(InMemoryTagRepository::new()),
        };
        execute(cli.command, cli.verbose, &config, stores).await
    } else {
        let pool = connect(&config.database)?;
        let stores = Stores {
            records: Arc::new(PostgresLogRecordRepository::new(pool.clone())),
            analyses: Arc::new(PostgresAnalysisRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            tags: Arc::new(PostgresTagRepository::new(pool)),
        };
        execute(cli.command, cli.verbose, &config, stores).await
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    if installed.is_err() {
        warn!("tracing subscriber already installed");
    }
}

fn load_config(path: Option<&Utf8PathBuf>) -> eyre::Result<FaultlineConfig> {
    let config = path
        .map(|file| FaultlineConfig::load(file))
        .transpose()?
        .unwrap_or_default();
    Ok(config.apply_env(|key| std::env::var(key).ok()))
}

fn connect(database: &DatabaseConfig) -> eyre::Result<Pool<ConnectionManager<PgConnection>>> {
    let url = database.url.as_deref().ok_or_else(|| {
        eyre!("no database URL configured; set {DATABASE_URL_ENV} or pass --in-memory")
    })?;
    Pool::builder()
        .max_size(database.max_connections)
        .build(ConnectionManager::<PgConnection>::new(url))
        .wrap_err("cannot connect to the database")
}

async fn execute<L, A, T, G>(
    command: Command,
    verbose: bool,
    config: &FaultlineConfig,
    stores: Stores<L, A, T, G>,
) -> eyre::Result<ExitCode>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    T: TaskRepository,
    G: TagRepository,
{
    match command {
        Command::Run(args) => {
            let options = args.options()?;
            let pipeline = build_pipeline(config, stores, options.escalate_issues);
            let summary = pipeline.run(&options).await?;
            print_summary(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Approve(args) => {
            let pipeline = build_pipeline(config, stores, args.escalate_issues);
            let policy = MaterializePolicy {
                escalate_issues: args.escalate_issues,
                ..MaterializePolicy::default()
            };
            let outcome = pipeline
                .materializer()
                .approve(args.analysis_id, &args.actor, &policy)
                .await?;
            print_outcome(&outcome)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::TestRemote => test_remote(config, stores).await,
        Command::CleanupTags(args) => cleanup_tags(stores.tags, &args, verbose).await,
    }
}

fn build_pipeline<L, A, T, G>(
    config: &FaultlineConfig,
    stores: Stores<L, A, T, G>,
    escalate_issues: bool,
) -> TriagePipeline<L, A, T, G, DefaultClock>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    T: TaskRepository,
    G: TagRepository,
{
    let mut pipeline = TriagePipeline::new(
        stores.records,
        stores.analyses,
        stores.tasks,
        stores.tags,
        Arc::new(DefaultClock),
    );

    if let Some(scanner) = LocalLogScanner::new(&config.local)
        .inspect_err(|err| warn!(error = %err, "local log scanning disabled"))
        .ok()
    {
        pipeline = pipeline.with_scanner(scanner);
    }

    if config.sentry.is_configured()
        && let Some(client) = SentryClient::new(&config.sentry)
            .inspect_err(|err| warn!(error = %err, "remote tracker disabled"))
            .ok()
    {
        pipeline = pipeline.with_remote(Arc::new(client), &config.sentry);
    }

    if let Some(provider) = provider_from_config(&config.reasoning)
        .inspect_err(|err| warn!(error = %err, "classification disabled"))
        .ok()
    {
        pipeline = pipeline.with_reasoning(provider);
    }

    if escalate_issues
        && let Some(tracker) = GitHubIssueTracker::new(&config.github)
            .inspect_err(|err| warn!(error = %err, "issue escalation disabled"))
            .ok()
    {
        pipeline = pipeline.with_issue_tracker(Arc::new(tracker));
    }

    pipeline
}

async fn test_remote<L, A, T, G>(
    config: &FaultlineConfig,
    stores: Stores<L, A, T, G>,
) -> eyre::Result<ExitCode>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    T: TaskRepository,
    G: TagRepository,
{
    let mut stdout = io::stdout().lock();
    if !config.sentry.is_configured() {
        writeln!(stdout, "Remote tracker is not configured.")?;
        return Ok(ExitCode::FAILURE);
    }
    let pipeline = build_pipeline(config, stores, false);
    if pipeline.test_remote().await {
        writeln!(stdout, "Remote tracker connection OK.")?;
        Ok(ExitCode::SUCCESS)
    } else {
        writeln!(stdout, "Remote tracker connection failed.")?;
        Ok(ExitCode::FAILURE)
    }
}

async fn cleanup_tags<G>(tags: Arc<G>, args: &CleanupArgs, verbose: bool) -> eyre::Result<ExitCode>
where
    G: TagRepository,
{
    let service = TagCleanupService::new(tags);
    let preview = service
        .run(&CleanupRequest {
            dry_run: true,
            confirmed: false,
            verbose,
        })
        .await?;

    if args.dry_run || preview.removable.is_empty() {
        print_cleanup(&preview)?;
        return Ok(ExitCode::SUCCESS);
    }

    let names: Vec<&str> = preview.removable.iter().map(TagName::as_str).collect();
    let question = format!(
        "Delete {} unused tags ({})?",
        names.len(),
        names.join(", ")
    );
    if !args.yes && !confirm(&question).await? {
        writeln!(io::stdout().lock(), "Aborted. No tags were deleted.")?;
        return Ok(ExitCode::SUCCESS);
    }

    let report = service
        .run(&CleanupRequest {
            dry_run: false,
            confirmed: true,
            verbose,
        })
        .await?;
    print_cleanup(&report)?;
    Ok(ExitCode::SUCCESS)
}

async fn confirm(question: &str) -> eyre::Result<bool> {
    {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{question} Type 'yes' to continue: ")?;
        stderr.flush()?;
    }
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(answer.trim() == "yes")
}

fn print_summary(summary: &PipelineSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "Triage run finished")?;
    writeln!(out, "  local records:   {}", summary.local_records)?;
    writeln!(out, "  remote records:  {}", summary.remote_records)?;
    writeln!(
        out,
        "  persisted:       {} new, {} duplicate, {} failed",
        summary.ingest.inserted, summary.ingest.skipped, summary.ingest.failed
    )?;
    if let Some(report) = summary.classification {
        writeln!(
            out,
            "  classified:      {} new, {} existing, {} failed",
            report.analyzed, report.existing, report.failed
        )?;
    }
    if let Some(report) = summary.materialization {
        writeln!(
            out,
            "  tasks:           {} created, {} escalated, {} failed",
            report.created, report.escalated, report.failed
        )?;
    }
    for failure in &summary.failures {
        writeln!(out, "  skipped {}: {}", failure.stage, failure.reason)?;
    }
    Ok(())
}

fn print_outcome(outcome: &MaterializeOutcome) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "Task {} created: {}", outcome.task.id(), outcome.task.title())?;
    if let Some(issue) = outcome.task.issue() {
        writeln!(out, "Issue {} filed: {}", issue.issue_ref(), issue.url())?;
    }
    Ok(())
}

fn print_cleanup(report: &CleanupReport) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let heading = if report.dry_run {
        "Tag cleanup (dry run)"
    } else {
        "Tag cleanup"
    };
    writeln!(out, "{heading}")?;
    writeln!(out, "  tags before:     {}", report.total_before)?;
    writeln!(out, "  unused:          {}", report.candidates)?;
    for name in &report.removable {
        let verb = if report.dry_run { "would delete" } else { "deleted" };
        writeln!(out, "    {verb} {name}")?;
    }
    for skipped in &report.skipped {
        writeln!(
            out,
            "    kept {} ({} references)",
            skipped.name, skipped.references
        )?;
    }
    if report.failed > 0 {
        writeln!(out, "  failed:          {}", report.failed)?;
    }
    writeln!(out, "  tags after:      {}", report.total_after)?;
    Ok(())
}
