//! Then steps for error triage BDD scenarios.

use faultline::log_record::ports::LogRecordRepository;
use faultline::tag::{domain::TagName, ports::TagRepository};
use faultline::task::ports::TaskRepository;
use rstest_bdd_macros::then;

use super::world::{TriageWorld, run_async};

#[then("{count:usize} tasks are created")]
fn tasks_created(world: &TriageWorld, count: usize) -> Result<(), eyre::Report> {
    let tasks = run_async(world.tasks.list_all())?;
    eyre::ensure!(
        tasks.len() == count,
        "expected {count} tasks, found {}",
        tasks.len()
    );
    Ok(())
}

#[then(r#"every task is tagged "{tag}""#)]
fn every_task_tagged(world: &TriageWorld, tag: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.tasks.list_all())?;
    if let Some(untagged) = tasks.iter().find(|task| !task.has_tag(&tag)) {
        return Err(eyre::eyre!("task {} lacks tag {tag}", untagged.id()));
    }
    Ok(())
}

#[then(r#"the approved task is assigned to "{actor}""#)]
fn approved_task_assignee(world: &TriageWorld, actor: String) -> Result<(), eyre::Report> {
    let outcome = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing approval outcome in scenario world"))?;
    eyre::ensure!(
        outcome.task.assignee() == Some(actor.as_str()),
        "expected assignee {actor}, found {:?}",
        outcome.task.assignee()
    );
    Ok(())
}

#[then("{count:u64} log records are stored")]
fn records_stored(world: &TriageWorld, count: u64) -> Result<(), eyre::Report> {
    let stored = run_async(world.records.count())?;
    eyre::ensure!(stored == count, "expected {count} records, found {stored}");
    Ok(())
}

#[then(r#"the tag "{name}" no longer exists"#)]
fn tag_removed(world: &TriageWorld, name: String) -> Result<(), eyre::Report> {
    let report = world
        .last_cleanup
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing cleanup report in scenario world"))?;
    let tag_name = TagName::new(name)?;
    eyre::ensure!(
        report.removable.contains(&tag_name),
        "cleanup did not report {tag_name} as removed"
    );
    let found = run_async(world.tags.find_by_name(&tag_name))?;
    eyre::ensure!(found.is_none(), "tag {tag_name} still exists");
    Ok(())
}

#[then(r#"the tag "{name}" still exists"#)]
fn tag_kept(world: &TriageWorld, name: String) -> Result<(), eyre::Report> {
    let tag_name = TagName::new(name)?;
    let found = run_async(world.tags.find_by_name(&tag_name))?;
    eyre::ensure!(found.is_some(), "tag {tag_name} was removed");
    Ok(())
}
