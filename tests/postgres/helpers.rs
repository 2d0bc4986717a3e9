//! Shared helpers for `PostgreSQL` integration tests.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::Clock;
use pg_embedded_setup_unpriv::TestCluster;
use precedence::dependency::adapters::postgres::PostgresDependencyRepository;
use precedence::status::adapters::postgres::PostgresTransitionRepository;
use precedence::status::domain::{
    Actor, TaskStatus, TransitionDraft, TransitionRecord, TriggerKind,
};
use precedence::task::domain::TaskIdentity;
use std::sync::{Mutex, PoisonError};
use tokio::runtime::Runtime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the dependency and transition tables.
const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_dependency_tables/up.sql");

/// Template database name for pre-migrated schema.
const TEMPLATE_DB: &str = "precedence_test_template";

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Creates a runtime whose blocking pool can hold two connections at once.
pub fn racing_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create racing runtime")
}

/// Ensures the template database exists with the schema applied.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TABLES_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

fn pool_for(
    cluster: &TestCluster,
    db_name: &str,
    max_size: u32,
) -> Result<Pool<ConnectionManager<PgConnection>>, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)
}

/// Creates a test database from the template and returns a history repository.
pub fn transition_repository(
    cluster: &TestCluster,
    db_name: &str,
    max_size: u32,
) -> Result<PostgresTransitionRepository, BoxError> {
    Ok(PostgresTransitionRepository::new(pool_for(
        cluster, db_name, max_size,
    )?))
}

/// Creates a test database from the template and returns an edge repository.
pub fn dependency_repository(
    cluster: &TestCluster,
    db_name: &str,
) -> Result<PostgresDependencyRepository, BoxError> {
    Ok(PostgresDependencyRepository::new(pool_for(
        cluster, db_name, 1,
    )?))
}

/// Guard that drops the test database even if the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!(
                "Warning: failed to drop test database {}: {e}",
                self.db_name
            );
        }
    }
}

/// Clock ticking one second per reading, starting on a whole second.
///
/// `TIMESTAMPTZ` keeps microseconds, so whole-second readings survive a
/// round trip unchanged.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self {
            next: Mutex::new(
                Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
                    .single()
                    .expect("valid start time"),
            ),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let now = *next;
        *next += TimeDelta::seconds(1);
        now
    }
}

pub fn task(number: u64) -> TaskIdentity {
    TaskIdentity::from_parts("P", number).expect("valid identity")
}

pub fn actor(name: &str) -> Actor {
    Actor::new(name).expect("valid actor")
}

/// Builds a manual transition record for task `P/number`.
pub fn record(
    clock: &SteppingClock,
    number: u64,
    from_status: TaskStatus,
    to_status: TaskStatus,
) -> TransitionRecord {
    draft_record(clock, number, from_status, to_status, false)
}

/// Builds a transition record awaiting approval.
pub fn pending_record(
    clock: &SteppingClock,
    number: u64,
    from_status: TaskStatus,
    to_status: TaskStatus,
) -> TransitionRecord {
    draft_record(clock, number, from_status, to_status, true)
}

fn draft_record(
    clock: &SteppingClock,
    number: u64,
    from_status: TaskStatus,
    to_status: TaskStatus,
    requires_approval: bool,
) -> TransitionRecord {
    let draft = TransitionDraft {
        task: task(number),
        from_status,
        to_status,
        actor: actor("agentA"),
        automated: false,
        trigger_kind: TriggerKind::Manual,
        reason: None,
        requires_approval,
    };
    TransitionRecord::new(draft, None, clock)
}
