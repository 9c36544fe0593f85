//! Error analysis persistence against `PostgreSQL`.

use crate::postgres::helpers::{
    StoredClock, TestDatabase, clock, database, local_record, pending_analysis, test_runtime,
};
use faultline::analysis::{
    domain::{AnalysisId, AnalysisStatus, Confidence, Severity},
    ports::{AnalysisRepository, AnalysisRepositoryError, CandidateFilter},
};
use faultline::log_record::{domain::LogRecord, ports::LogRecordRepository};
use faultline::task::{
    domain::{IssueLink, IssueRef, NewTask, Task},
    ports::TaskRepository,
};
use rstest::rstest;
use tokio::runtime::Runtime;

fn stored_record(
    database: &TestDatabase,
    rt: &Runtime,
    clock: StoredClock,
    offset: i64,
) -> LogRecord {
    let record = local_record(clock, offset, &format!("checkout failed #{offset}"));
    rt.block_on(database.records().insert(&record))
        .expect("insert record");
    record
}

#[rstest]
fn one_analysis_per_record(clock: StoredClock, database: TestDatabase) {
    let repo = database.analyses();
    let rt = test_runtime();
    let record = stored_record(&database, &rt, clock, 0);
    let analysis = pending_analysis(&record, Severity::High, 0.9, clock);

    rt.block_on(repo.store(&analysis)).expect("store");
    let by_record = rt
        .block_on(repo.find_by_record(record.id()))
        .expect("lookup")
        .expect("analysis exists");
    assert_eq!(by_record, analysis);

    let second = pending_analysis(&record, Severity::Low, 0.4, clock);
    let result = rt.block_on(repo.store(&second));
    assert!(
        matches!(result, Err(AnalysisRepositoryError::DuplicateRecord(id)) if id == record.id()),
        "expected DuplicateRecord, got: {result:?}"
    );
}

#[rstest]
fn candidates_are_pending_and_above_thresholds(clock: StoredClock, database: TestDatabase) {
    let repo = database.analyses();
    let rt = test_runtime();
    let wanted = pending_analysis(
        &stored_record(&database, &rt, clock, 0),
        Severity::Critical,
        0.95,
        clock,
    );
    let unsure = pending_analysis(
        &stored_record(&database, &rt, clock, 1),
        Severity::Critical,
        0.5,
        clock,
    );
    let minor = pending_analysis(
        &stored_record(&database, &rt, clock, 2),
        Severity::Low,
        0.95,
        clock,
    );
    let mut approved = pending_analysis(
        &stored_record(&database, &rt, clock, 3),
        Severity::High,
        0.9,
        clock,
    );
    approved.approve("ops-oncall", &clock).expect("approve");
    for analysis in [&wanted, &unsure, &minor, &approved] {
        rt.block_on(repo.store(analysis)).expect("store");
    }

    let filter = CandidateFilter {
        min_severity: Severity::Medium,
        min_confidence: Confidence::new(0.7).expect("valid confidence"),
        limit: 10,
    };
    let candidates = rt
        .block_on(repo.list_candidates(&filter))
        .expect("candidates");

    let ids: Vec<AnalysisId> = candidates.iter().map(|analysis| analysis.id()).collect();
    assert_eq!(ids, vec![wanted.id()]);
}

#[rstest]
fn task_and_issue_linkage_persists(clock: StoredClock, database: TestDatabase) {
    let repo = database.analyses();
    let rt = test_runtime();
    let mut analysis = pending_analysis(
        &stored_record(&database, &rt, clock, 0),
        Severity::High,
        0.9,
        clock,
    );
    rt.block_on(repo.store(&analysis)).expect("store");

    let task = Task::new(NewTask::new("Checkout rejects orders", "details"), &clock)
        .expect("valid task");
    rt.block_on(database.tasks().store(&task))
        .expect("store task");
    let later = clock.later(60);
    analysis
        .mark_task_created(task.id(), &later)
        .expect("mark task created");
    let issue_ref = IssueRef::from_parts("github", "acme/shop", 314).expect("valid issue ref");
    analysis
        .link_issue(
            IssueLink::new(issue_ref, "https://github.com/acme/shop/issues/314", later.0),
            &later,
        )
        .expect("link issue");
    rt.block_on(repo.update(&analysis)).expect("update");

    let stored = rt
        .block_on(repo.find_by_id(analysis.id()))
        .expect("lookup")
        .expect("analysis exists");
    assert_eq!(stored, analysis);
    assert_eq!(stored.status(), AnalysisStatus::TaskCreated);
    assert_eq!(stored.task_id(), Some(task.id()));
    assert_eq!(
        stored.issue().map(|link| link.issue_ref().to_string()),
        Some("acme/shop#314".to_owned())
    );
}

#[rstest]
fn deleting_a_task_detaches_its_analysis(clock: StoredClock, database: TestDatabase) {
    let repo = database.analyses();
    let rt = test_runtime();
    let mut analysis = pending_analysis(
        &stored_record(&database, &rt, clock, 0),
        Severity::High,
        0.9,
        clock,
    );
    let task = Task::new(NewTask::new("Checkout rejects orders", "details"), &clock)
        .expect("valid task");
    rt.block_on(database.tasks().store(&task))
        .expect("store task");
    analysis
        .mark_task_created(task.id(), &clock)
        .expect("mark task created");
    rt.block_on(repo.store(&analysis)).expect("store");

    assert!(
        rt.block_on(database.tasks().delete(task.id()))
            .expect("delete task")
    );

    let stored = rt
        .block_on(repo.find_by_id(analysis.id()))
        .expect("lookup")
        .expect("analysis exists");
    assert_eq!(stored.task_id(), None);
}

#[rstest]
fn updating_a_missing_analysis_is_not_found(clock: StoredClock, database: TestDatabase) {
    let repo = database.analyses();
    let rt = test_runtime();
    let analysis = pending_analysis(
        &stored_record(&database, &rt, clock, 0),
        Severity::High,
        0.9,
        clock,
    );

    let result = rt.block_on(repo.update(&analysis));

    assert!(
        matches!(result, Err(AnalysisRepositoryError::NotFound(id)) if id == analysis.id()),
        "expected NotFound, got: {result:?}"
    );
}
