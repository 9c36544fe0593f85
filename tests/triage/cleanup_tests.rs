//! In-memory integration tests for unused tag cleanup.

use std::sync::Arc;

use faultline::tag::{
    domain::{Tag, TagName},
    ports::TagRepository,
    services::{CleanupError, CleanupRequest, TagCleanupService},
};
use faultline::task::ports::TaskRepository;
use mockable::DefaultClock;
use rstest::rstest;

use super::helpers::{ScriptedProvider, Stores, local_only, recent_log_dir};

async fn triaged_stores() -> Result<Stores, eyre::Report> {
    let dir = recent_log_dir();
    let stores = Stores::new();
    stores
        .pipeline(&dir)
        .with_reasoning(Arc::new(ScriptedProvider::rating("critical", "0.9")))
        .run(&local_only())
        .await?;
    Ok(stores)
}

async fn add_tag(stores: &Stores, name: &str) -> Result<Tag, eyre::Report> {
    let candidate = Tag::new(TagName::new(name)?, &DefaultClock);
    Ok(stores.tags.ensure(&candidate).await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dry_run_reports_without_deleting() -> Result<(), eyre::Report> {
    let stores = triaged_stores().await?;
    add_tag(&stores, "stale").await?;
    let service = TagCleanupService::new(Arc::clone(&stores.tags));

    let report = service
        .run(&CleanupRequest {
            dry_run: true,
            ..CleanupRequest::default()
        })
        .await?;

    eyre::ensure!(report.dry_run, "report should be marked as dry run");
    eyre::ensure!(report.candidates == 1, "only the stale tag is unused");
    eyre::ensure!(
        report.removable == vec![TagName::new("stale")?],
        "unexpected removable tags {:?}",
        report.removable
    );
    eyre::ensure!(report.deleted == 0, "dry run must not delete");
    eyre::ensure!(report.total_before == report.total_after, "tag count changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destructive_run_requires_confirmation() -> Result<(), eyre::Report> {
    let stores = triaged_stores().await?;
    add_tag(&stores, "stale").await?;
    let service = TagCleanupService::new(Arc::clone(&stores.tags));

    let result = service.run(&CleanupRequest::default()).await;

    eyre::ensure!(
        matches!(result, Err(CleanupError::ConfirmationRequired)),
        "expected a confirmation error, got {result:?}"
    );
    eyre::ensure!(stores.tags.count().await? == 4, "no tag may be deleted");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn confirmed_run_keeps_tags_in_use() -> Result<(), eyre::Report> {
    let stores = triaged_stores().await?;
    add_tag(&stores, "stale").await?;
    let legacy = add_tag(&stores, "legacy").await?;
    let task = stores
        .tasks
        .list_all()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("triage should have created a task"))?;
    stores.tags.link_task(legacy.id(), task.id()).await?;
    let service = TagCleanupService::new(Arc::clone(&stores.tags));

    let report = service
        .run(&CleanupRequest {
            confirmed: true,
            ..CleanupRequest::default()
        })
        .await?;

    eyre::ensure!(report.total_before == 5, "expected five tags before cleanup");
    eyre::ensure!(report.candidates == 2, "stale and legacy have zero cached usage");
    eyre::ensure!(report.deleted == 1, "only the stale tag is deletable");
    eyre::ensure!(
        report.skipped.iter().map(|skipped| skipped.name.as_str()).eq(["legacy"]),
        "legacy is still referenced, skipped {:?}",
        report.skipped
    );
    eyre::ensure!(report.total_after == 4, "expected four tags after cleanup");
    eyre::ensure!(
        stores.tags.find_by_name(&TagName::new("stale")?).await?.is_none(),
        "stale tag should be gone"
    );
    eyre::ensure!(
        stores.tags.find_by_name(&TagName::new("bug")?).await?.is_some(),
        "tags in use must survive"
    );
    Ok(())
}
