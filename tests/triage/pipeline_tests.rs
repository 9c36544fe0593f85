//! In-memory integration tests for the full triage pipeline.

use std::sync::Arc;

use faultline::analysis::{
    domain::{AnalysisId, AnalysisStatus},
    ports::AnalysisRepository,
};
use faultline::log_record::{domain::LogLevel, ports::LogRecordRepository};
use faultline::tag::{domain::TagName, ports::TagRepository};
use faultline::task::{domain::TaskStatus, ports::TaskRepository};
use rstest::rstest;

use super::helpers::{ScriptedProvider, Stores, local_only, recent_log_dir};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn urgent_errors_become_tagged_tasks() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let provider = Arc::new(ScriptedProvider::rating("critical", "0.92"));
    let pipeline = stores.pipeline(&dir).with_reasoning(provider.clone());

    let summary = pipeline.run(&local_only()).await?;

    eyre::ensure!(summary.local_records == 2, "expected warning and error lines");
    eyre::ensure!(summary.failures.is_empty(), "unexpected failures: {:?}", summary.failures);
    eyre::ensure!(provider.calls() == 2, "each record is classified once");

    let tasks = stores.tasks.list_all().await?;
    eyre::ensure!(tasks.len() == 2, "expected two tasks, found {}", tasks.len());
    for task in &tasks {
        eyre::ensure!(task.status() == TaskStatus::New, "task should start as new");
        eyre::ensure!(task.title() == "🐛 Checkout is failing", "unexpected title {}", task.title());
        for tag in ["bug", "auto-generated", "urgent"] {
            eyre::ensure!(task.has_tag(tag), "task is missing tag {tag}");
        }
        eyre::ensure!(!task.has_tag("sentry"), "local tasks are not tagged sentry");
    }

    let urgent = stores
        .tags
        .find_by_name(&TagName::new("urgent")?)
        .await?
        .ok_or_else(|| eyre::eyre!("urgent tag not registered"))?;
    eyre::ensure!(urgent.usage_count() == 2, "urgent tag should count both tasks");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exception_details_reach_the_task_description() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("high", "0.8")));

    pipeline.run(&local_only()).await?;

    let tasks = stores.tasks.list_all().await?;
    let with_exception = tasks
        .iter()
        .find(|task| task.description().contains("### Exception details"))
        .ok_or_else(|| eyre::eyre!("no task carries exception details"))?;
    eyre::ensure!(
        with_exception.description().contains("**Type:** `KeyError`"),
        "exception type missing from description"
    );
    eyre::ensure!(
        with_exception.description().contains("order_id"),
        "exception value missing from description"
    );
    eyre::ensure!(
        with_exception.description().contains("cart.py"),
        "stack frames missing from description"
    );
    eyre::ensure!(
        with_exception.description().contains("checkout failed - order rejected"),
        "original message should keep its dashes"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_runs_are_idempotent() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let provider = Arc::new(ScriptedProvider::rating("critical", "0.92"));
    let pipeline = stores.pipeline(&dir).with_reasoning(provider.clone());

    pipeline.run(&local_only()).await?;
    let second = pipeline.run(&local_only()).await?;

    eyre::ensure!(second.ingest.inserted == 0, "no record should be inserted twice");
    eyre::ensure!(second.ingest.skipped == 2, "both records should be skipped");
    eyre::ensure!(provider.calls() == 2, "records must not be reclassified");
    eyre::ensure!(stores.records.count().await? == 2, "record count changed");
    eyre::ensure!(stores.tasks.list_all().await?.len() == 2, "task count changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn low_confidence_analyses_stay_pending() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("critical", "0.4")));

    let summary = pipeline.run(&local_only()).await?;

    let created = summary.materialization.map(|report| report.created);
    eyre::ensure!(created == Some(0), "no task expected, got {created:?}");
    eyre::ensure!(stores.tasks.list_all().await?.is_empty(), "tasks were created");

    let records = stores
        .records
        .list_unanalyzed(LogLevel::Debug, 10)
        .await?;
    eyre::ensure!(records.is_empty(), "every collected record should be analysed");
    let first = summary
        .classification
        .ok_or_else(|| eyre::eyre!("classification stage did not run"))?;
    eyre::ensure!(first.analyzed == 2, "expected two analyses");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn analyses_link_their_tasks() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("medium", "0.7")));

    pipeline.run(&local_only()).await?;

    let tasks = stores.tasks.list_all().await?;
    eyre::ensure!(tasks.len() == 2, "analyses at the threshold should produce tasks");
    for task in &tasks {
        eyre::ensure!(!task.has_tag("urgent"), "medium severity is not urgent");
        eyre::ensure!(task.assignee().is_none(), "batch tasks are unassigned");

        let analysis_id: AnalysisId = task
            .description()
            .rsplit("Analysis: `")
            .next()
            .and_then(|tail| tail.split('`').next())
            .ok_or_else(|| eyre::eyre!("description lacks an analysis reference"))?
            .parse()?;
        let analysis = stores
            .analyses
            .find_by_id(analysis_id)
            .await?
            .ok_or_else(|| eyre::eyre!("analysis {analysis_id} not stored"))?;
        eyre::ensure!(
            analysis.status() == AnalysisStatus::TaskCreated,
            "analysis should be task_created, found {}",
            analysis.status()
        );
        eyre::ensure!(analysis.task_id() == Some(task.id()), "analysis links another task");
    }
    Ok(())
}
