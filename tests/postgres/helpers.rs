//! Shared helpers for `PostgreSQL` integration tests.

use chrono::{DateTime, Local, SubsecRound, TimeDelta, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use faultline::analysis::adapters::postgres::PostgresAnalysisRepository;
use faultline::analysis::domain::{Confidence, ErrorAnalysis, Judgement, Severity};
use faultline::log_record::adapters::postgres::{LogRecordPgPool, PostgresLogRecordRepository};
use faultline::log_record::domain::{ExceptionDetails, LogLevel, LogRecord, NewLogRecord};
use faultline::tag::adapters::postgres::PostgresTagRepository;
use faultline::task::adapters::postgres::PostgresTaskRepository;
use mockable::Clock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::fixture;
use tokio::runtime::Runtime;

/// SQL creating log records, analyses and tasks.
const CREATE_TRIAGE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_triage_tables/up.sql");

/// SQL creating tags and task-tag links.
const CREATE_TAG_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000001_create_tag_tables/up.sql");

/// Template database holding the migrated schema.
const TEMPLATE_DB: &str = "faultline_test_template";

/// Creates a tokio runtime for driving the async repository API.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Clock frozen at the current second.
///
/// `TIMESTAMPTZ` keeps microseconds, so whole seconds survive a round trip.
#[derive(Debug, Clone, Copy)]
pub struct StoredClock(pub DateTime<Utc>);

impl StoredClock {
    /// Returns a clock `seconds` later than this one.
    pub fn later(self, seconds: i64) -> Self {
        Self(self.0 + TimeDelta::seconds(seconds))
    }
}

impl Clock for StoredClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Provides a [`StoredClock`] at the current second.
#[fixture]
pub fn clock() -> StoredClock {
    StoredClock(Utc::now().trunc_subsecs(0))
}

/// A scratch database cloned from the migrated template.
///
/// The database is dropped when the value goes out of scope.
pub struct TestDatabase {
    cluster: &'static TestCluster,
    name: String,
    pool: Option<LogRecordPgPool>,
}

impl TestDatabase {
    fn pool(&self) -> LogRecordPgPool {
        self.pool.clone().expect("pool lives until drop")
    }

    /// Returns a log record repository over this database.
    pub fn records(&self) -> PostgresLogRecordRepository {
        PostgresLogRecordRepository::new(self.pool())
    }

    /// Returns an analysis repository over this database.
    pub fn analyses(&self) -> PostgresAnalysisRepository {
        PostgresAnalysisRepository::new(self.pool())
    }

    /// Returns a task repository over this database.
    pub fn tasks(&self) -> PostgresTaskRepository {
        PostgresTaskRepository::new(self.pool())
    }

    /// Returns a tag repository over this database.
    pub fn tags(&self) -> PostgresTagRepository {
        PostgresTagRepository::new(self.pool())
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Open connections would block DROP DATABASE.
        drop(self.pool.take());
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// Ensures the template database exists with every migration applied.
fn ensure_template(cluster: &TestCluster) {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TRIAGE_TABLES_SQL)
                .map_err(|e| eyre::eyre!("triage tables: {e}"))?;
            conn.batch_execute(CREATE_TAG_TABLES_SQL)
                .map_err(|e| eyre::eyre!("tag tables: {e}"))?;
            Ok(())
        })
        .expect("template setup");
}

/// Provides a fresh database on the shared cluster.
#[fixture]
pub fn database(shared_test_cluster: &'static TestCluster) -> TestDatabase {
    ensure_template(shared_test_cluster);
    let name = format!("test_{}", uuid::Uuid::new_v4().simple());
    shared_test_cluster
        .create_database_from_template(name.as_str(), TEMPLATE_DB)
        .expect("create database from template");
    let url = shared_test_cluster.connection().database_url(&name);
    // A single connection keeps statement ordering deterministic.
    let pool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<PgConnection>::new(url))
        .expect("connection pool");
    TestDatabase {
        cluster: shared_test_cluster,
        name,
        pool: Some(pool),
    }
}

/// Builds an error-level local record logged `offset` seconds after `clock`.
pub fn local_record(clock: StoredClock, offset: i64, message: &str) -> LogRecord {
    LogRecord::new(
        NewLogRecord::local(
            clock.later(offset).0,
            LogLevel::Error,
            "shop.orders",
            message,
        )
        .with_exception(ExceptionDetails {
            exception_type: "KeyError".to_owned(),
            exception_value: "'order_id'".to_owned(),
            stack_trace: "KeyError: 'order_id'\n  File \"orders.py\", line 88".to_owned(),
        }),
        &clock,
    )
    .expect("valid local record")
}

/// Builds a remote record carrying `event_id`.
pub fn remote_record(clock: StoredClock, event_id: &str) -> LogRecord {
    LogRecord::new(
        NewLogRecord::remote(clock.0, LogLevel::Critical, "worker", "job crashed", event_id)
            .with_remote_issue_id("4711"),
        &clock,
    )
    .expect("valid remote record")
}

/// Builds a pending analysis of `record`.
pub fn pending_analysis(
    record: &LogRecord,
    severity: Severity,
    confidence: f64,
    clock: StoredClock,
) -> ErrorAnalysis {
    let judgement = Judgement {
        severity,
        is_actionable: true,
        summary: "Checkout rejects orders".to_owned(),
        root_cause: "Payload lacks the order key".to_owned(),
        recommended_action: "Validate the payload before lookup".to_owned(),
        confidence: Confidence::new(confidence).expect("valid confidence"),
    };
    ErrorAnalysis::new_pending(record.id(), judgement, &clock)
}
