//! Task persistence against `PostgreSQL`.

use crate::postgres::helpers::{StoredClock, TestDatabase, clock, database, test_runtime};
use faultline::tag::domain::TagName;
use faultline::task::{
    domain::{IssueLink, IssueRef, NewTask, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use rstest::rstest;

fn tagged_task(clock: StoredClock, title: &str) -> Task {
    let tags = ["bug", "auto-generated", "urgent"].map(|name| TagName::new(name).expect("valid tag"));
    Task::new(
        NewTask::new(title, "### Exception details\n**Type:** `KeyError`")
            .with_tags(tags)
            .with_assignee("ops-oncall"),
        &clock,
    )
    .expect("valid task")
}

#[rstest]
fn tags_and_issue_survive_the_jsonb_round_trip(clock: StoredClock, database: TestDatabase) {
    let repo = database.tasks();
    let rt = test_runtime();
    let mut task = tagged_task(clock, "Checkout rejects orders");
    rt.block_on(repo.store(&task)).expect("store");

    let later = clock.later(30);
    let issue_ref = IssueRef::from_parts("github", "acme/shop", 42).expect("valid issue ref");
    task.link_issue(
        IssueLink::new(issue_ref, "https://github.com/acme/shop/issues/42", later.0),
        &later,
    )
    .expect("link issue");
    rt.block_on(repo.update(&task)).expect("update");

    let stored = rt
        .block_on(repo.find_by_id(task.id()))
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored, task);
    assert!(stored.has_tag("urgent"));
    assert_eq!(
        stored.issue().map(|link| link.issue_ref().issue_number().value()),
        Some(42)
    );
}

#[rstest]
fn storing_the_same_task_twice_is_rejected(clock: StoredClock, database: TestDatabase) {
    let repo = database.tasks();
    let rt = test_runtime();
    let task = tagged_task(clock, "Checkout rejects orders");

    rt.block_on(repo.store(&task)).expect("store");
    let result = rt.block_on(repo.store(&task));

    assert!(
        matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "expected DuplicateTask, got: {result:?}"
    );
}

#[rstest]
fn delete_reports_whether_a_row_was_removed(clock: StoredClock, database: TestDatabase) {
    let repo = database.tasks();
    let rt = test_runtime();
    let kept = tagged_task(clock, "Cache misses spike");
    let discarded = tagged_task(clock.later(1), "Checkout rejects orders");
    rt.block_on(repo.store(&kept)).expect("store");
    rt.block_on(repo.store(&discarded)).expect("store");

    assert!(rt.block_on(repo.delete(discarded.id())).expect("delete"));
    assert!(!rt.block_on(repo.delete(discarded.id())).expect("delete"));
    assert!(!rt.block_on(repo.delete(TaskId::new())).expect("delete"));

    let remaining = rt.block_on(repo.list_all()).expect("list");
    let ids: Vec<TaskId> = remaining.iter().map(Task::id).collect();
    assert_eq!(ids, vec![kept.id()]);
}

#[rstest]
fn updating_a_missing_task_is_not_found(clock: StoredClock, database: TestDatabase) {
    let repo = database.tasks();
    let rt = test_runtime();
    let task = tagged_task(clock, "Checkout rejects orders");

    let result = rt.block_on(repo.update(&task));

    assert!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()),
        "expected NotFound, got: {result:?}"
    );
}
