//! Log record persistence against `PostgreSQL`.

use crate::postgres::helpers::{
    StoredClock, TestDatabase, clock, database, local_record, remote_record, test_runtime,
};
use faultline::log_record::{
    domain::{LogLevel, LogRecord, NewLogRecord, RecordId},
    ports::{LogRecordRepository, LogRecordRepositoryError},
};
use rstest::rstest;

#[rstest]
fn inserted_record_reads_back_unchanged(clock: StoredClock, database: TestDatabase) {
    let repo = database.records();
    let rt = test_runtime();
    let record = local_record(clock, 0, "checkout failed");

    rt.block_on(repo.insert(&record)).expect("insert");
    let stored = rt
        .block_on(repo.find_by_id(record.id()))
        .expect("lookup")
        .expect("record exists");

    assert_eq!(stored, record);
    assert_eq!(stored.exception().exception_type, "KeyError");
    assert!(
        rt.block_on(repo.find_by_id(RecordId::new()))
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
fn local_identity_is_unique(clock: StoredClock, database: TestDatabase) {
    let repo = database.records();
    let rt = test_runtime();
    let first = local_record(clock, 0, "checkout failed");
    let again = local_record(clock, 0, "checkout failed");

    rt.block_on(repo.insert(&first)).expect("insert");
    assert!(
        rt.block_on(repo.exists_local(&again.local_identity()))
            .expect("exists check")
    );

    let result = rt.block_on(repo.insert(&again));
    assert!(
        matches!(result, Err(LogRecordRepositoryError::DuplicateLocalRecord(_))),
        "expected DuplicateLocalRecord, got: {result:?}"
    );
    assert_eq!(rt.block_on(repo.count()).expect("count"), 1);
}

#[rstest]
fn event_id_index_maps_to_duplicate_event(clock: StoredClock, database: TestDatabase) {
    let repo = database.records();
    let rt = test_runtime();
    let first = remote_record(clock, "evt-9f2");
    let again = remote_record(clock.later(5), "evt-9f2");

    rt.block_on(repo.insert(&first)).expect("insert");
    let result = rt.block_on(repo.insert(&again));

    assert!(
        matches!(result, Err(LogRecordRepositoryError::DuplicateEventId(ref id)) if id == "evt-9f2"),
        "expected DuplicateEventId, got: {result:?}"
    );
    assert!(result.is_err_and(|err| err.is_duplicate()));
    let found = rt
        .block_on(repo.find_by_event_id("evt-9f2"))
        .expect("lookup")
        .expect("event stored");
    assert_eq!(found.id(), first.id());
    assert_eq!(found.remote_issue_id(), Some("4711"));
}

#[rstest]
fn unanalyzed_listing_filters_orders_and_limits(clock: StoredClock, database: TestDatabase) {
    let repo = database.records();
    let rt = test_runtime();
    let noise = LogRecord::new(
        NewLogRecord::local(clock.0, LogLevel::Info, "shop.http", "GET /health 200"),
        &clock,
    )
    .expect("valid record");
    let older = local_record(clock, 1, "older");
    let newer = local_record(clock, 2, "newer");
    let analyzed = local_record(clock, 3, "analyzed");
    for record in [&noise, &older, &newer, &analyzed] {
        rt.block_on(repo.insert(record)).expect("insert");
    }
    rt.block_on(repo.mark_analyzed(analyzed.id()))
        .expect("mark analyzed");

    let listed = rt
        .block_on(repo.list_unanalyzed(LogLevel::Warning, 10))
        .expect("listing");
    let messages: Vec<&str> = listed.iter().map(LogRecord::message).collect();
    assert_eq!(messages, vec!["newer", "older"]);

    let capped = rt
        .block_on(repo.list_unanalyzed(LogLevel::Debug, 1))
        .expect("listing");
    assert_eq!(capped.len(), 1);
}

#[rstest]
fn marking_a_missing_record_is_not_found(database: TestDatabase) {
    let repo = database.records();
    let rt = test_runtime();
    let missing = RecordId::new();

    let result = rt.block_on(repo.mark_analyzed(missing));

    assert!(
        matches!(result, Err(LogRecordRepositoryError::NotFound(id)) if id == missing),
        "expected NotFound, got: {result:?}"
    );
}
