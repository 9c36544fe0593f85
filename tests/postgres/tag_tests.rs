//! Tag persistence against `PostgreSQL`.

use crate::postgres::helpers::{StoredClock, TestDatabase, clock, database, test_runtime};
use faultline::tag::{
    domain::{Tag, TagId, TagName},
    ports::{TagRepository, TagRepositoryError},
};
use faultline::task::{
    domain::{NewTask, Task},
    ports::TaskRepository,
};
use rstest::rstest;
use tokio::runtime::Runtime;

fn name(raw: &str) -> TagName {
    TagName::new(raw).expect("valid tag name")
}

fn stored_task(database: &TestDatabase, rt: &Runtime, clock: StoredClock, title: &str) -> Task {
    let task = Task::new(NewTask::new(title, "details"), &clock).expect("valid task");
    rt.block_on(database.tasks().store(&task))
        .expect("store task");
    task
}

#[rstest]
fn ensure_returns_the_existing_tag_for_a_known_name(clock: StoredClock, database: TestDatabase) {
    let repo = database.tags();
    let rt = test_runtime();

    let first = rt
        .block_on(repo.ensure(&Tag::new(name("urgent"), &clock)))
        .expect("ensure");
    let second = rt
        .block_on(repo.ensure(&Tag::new(name("URGENT"), &clock.later(10))))
        .expect("ensure");

    assert_eq!(second.id(), first.id());
    assert_eq!(second.created_at(), clock.0);
    assert_eq!(rt.block_on(repo.count()).expect("count"), 1);
    assert_eq!(
        rt.block_on(repo.find_by_name(&name("urgent")))
            .expect("lookup")
            .map(|tag| tag.id()),
        Some(first.id())
    );
}

#[rstest]
fn usage_counter_follows_task_links(clock: StoredClock, database: TestDatabase) {
    let repo = database.tags();
    let rt = test_runtime();
    let bug = rt
        .block_on(repo.ensure(&Tag::new(name("bug"), &clock)))
        .expect("ensure");
    let checkout = stored_task(&database, &rt, clock, "Checkout rejects orders");
    let cache = stored_task(&database, &rt, clock, "Cache misses spike");

    rt.block_on(repo.link_task(bug.id(), checkout.id()))
        .expect("link");
    rt.block_on(repo.link_task(bug.id(), checkout.id()))
        .expect("relink is a no-op");
    rt.block_on(repo.link_task(bug.id(), cache.id()))
        .expect("link");
    assert_eq!(
        rt.block_on(repo.count_references(bug.id()))
            .expect("references"),
        2
    );
    let stale = rt
        .block_on(repo.find_by_name(&name("bug")))
        .expect("lookup")
        .expect("tag exists");
    assert_eq!(stale.usage_count(), 0);

    assert_eq!(
        rt.block_on(repo.refresh_usage_count(bug.id()))
            .expect("refresh"),
        2
    );
    assert!(
        rt.block_on(database.tasks().delete(cache.id()))
            .expect("delete task")
    );
    assert_eq!(
        rt.block_on(repo.refresh_usage_count(bug.id()))
            .expect("refresh"),
        1
    );
}

#[rstest]
fn unused_tags_are_listed_by_name_and_deletable(clock: StoredClock, database: TestDatabase) {
    let repo = database.tags();
    let rt = test_runtime();
    for raw in ["sentry", "flaky", "bug"] {
        rt.block_on(repo.ensure(&Tag::new(name(raw), &clock)))
            .expect("ensure");
    }
    let bug = rt
        .block_on(repo.find_by_name(&name("bug")))
        .expect("lookup")
        .expect("tag exists");
    let task = stored_task(&database, &rt, clock, "Checkout rejects orders");
    rt.block_on(repo.link_task(bug.id(), task.id()))
        .expect("link");
    rt.block_on(repo.refresh_usage_count(bug.id()))
        .expect("refresh");

    let unused = rt.block_on(repo.list_unused()).expect("unused");
    let names: Vec<&str> = unused.iter().map(|tag| tag.name().as_str()).collect();
    assert_eq!(names, vec!["flaky", "sentry"]);

    let flaky = unused.first().expect("flaky listed");
    assert!(rt.block_on(repo.delete(flaky.id())).expect("delete"));
    assert!(!rt.block_on(repo.delete(flaky.id())).expect("delete"));
    assert_eq!(rt.block_on(repo.count()).expect("count"), 2);
}

#[rstest]
fn linking_an_unknown_tag_is_not_found(clock: StoredClock, database: TestDatabase) {
    let repo = database.tags();
    let rt = test_runtime();
    let task = stored_task(&database, &rt, clock, "Checkout rejects orders");
    let missing = TagId::new();

    let result = rt.block_on(repo.link_task(missing, task.id()));

    assert!(
        matches!(result, Err(TagRepositoryError::NotFound(id)) if id == missing),
        "expected NotFound, got: {result:?}"
    );
}
