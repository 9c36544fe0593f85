//! In-memory integration tests for manual approval.

use std::sync::Arc;

use faultline::analysis::{
    domain::{AnalysisDomainError, AnalysisStatus, Confidence, ErrorAnalysis, Severity},
    ports::{AnalysisRepository, CandidateFilter},
};
use faultline::task::{
    ports::TaskRepository,
    services::{MaterializeError, MaterializePolicy},
};
use rstest::rstest;

use super::helpers::{ScriptedProvider, Stores, local_only, recent_log_dir};

async fn pending_analyses(stores: &Stores) -> Result<Vec<ErrorAnalysis>, eyre::Report> {
    let filter = CandidateFilter {
        min_severity: Severity::Low,
        min_confidence: Confidence::from_percent(0),
        limit: 10,
    };
    Ok(stores.analyses.list_candidates(&filter).await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_materialises_a_low_confidence_analysis() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("high", "0.4")));
    pipeline.run(&local_only()).await?;

    let pending = pending_analyses(&stores).await?;
    eyre::ensure!(pending.len() == 2, "both analyses should await approval");
    let target = pending
        .first()
        .ok_or_else(|| eyre::eyre!("missing pending analysis"))?
        .id();

    let outcome = pipeline
        .materializer()
        .approve(target, "  dana  ", &MaterializePolicy::default())
        .await?;

    eyre::ensure!(outcome.task.assignee() == Some("dana"), "approver should own the task");
    eyre::ensure!(outcome.analysis.approved_by() == Some("dana"), "approver not recorded");
    eyre::ensure!(outcome.analysis.approved_at().is_some(), "approval time not recorded");
    eyre::ensure!(
        outcome.analysis.status() == AnalysisStatus::TaskCreated,
        "approved analysis should be task_created"
    );
    eyre::ensure!(!outcome.escalated, "escalation is disabled by default");
    eyre::ensure!(stores.tasks.list_all().await?.len() == 1, "exactly one task expected");
    eyre::ensure!(pending_analyses(&stores).await?.len() == 1, "one analysis stays pending");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_requires_an_actor() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("high", "0.4")));
    pipeline.run(&local_only()).await?;
    let target = pending_analyses(&stores)
        .await?
        .first()
        .ok_or_else(|| eyre::eyre!("missing pending analysis"))?
        .id();

    let result = pipeline
        .materializer()
        .approve(target, "   ", &MaterializePolicy::default())
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(MaterializeError::Analysis(AnalysisDomainError::EmptyActor))
        ),
        "expected an empty actor error, got {result:?}"
    );
    eyre::ensure!(stores.tasks.list_all().await?.is_empty(), "no task may be created");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn materialised_analyses_cannot_be_approved() -> Result<(), eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    let pipeline = stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("high", "0.4")));
    pipeline.run(&local_only()).await?;
    let target = pending_analyses(&stores)
        .await?
        .first()
        .ok_or_else(|| eyre::eyre!("missing pending analysis"))?
        .id();
    let policy = MaterializePolicy::default();
    pipeline.materializer().approve(target, "dana", &policy).await?;

    let result = pipeline.materializer().approve(target, "eli", &policy).await;

    eyre::ensure!(
        matches!(
            result,
            Err(MaterializeError::NotEligible {
                status: AnalysisStatus::TaskCreated,
                ..
            })
        ),
        "expected not eligible, got {result:?}"
    );
    eyre::ensure!(stores.tasks.list_all().await?.len() == 1, "no second task expected");
    Ok(())
}
