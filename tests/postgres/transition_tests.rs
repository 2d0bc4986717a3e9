//! Transition history tests against `PostgreSQL`.

use super::helpers::{
    CleanupGuard, SteppingClock, actor, ensure_template, pending_record, racing_runtime, record,
    task, test_runtime, transition_repository,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use precedence::status::domain::{
    PersistedTransitionRecord, TaskStatus, TransitionRecord, TransitionRecordId,
};
use precedence::status::ports::{TransitionRepository, TransitionRepositoryError};
use precedence::status::services::{StatusTransitionService, TransitionRequest};
use precedence::task::adapters::memory::InMemoryTaskRegistry;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
fn appended_records_load_in_chain_order(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_order_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let chain = [
        record(&clock, 1, TaskStatus::ToDo, TaskStatus::InProgress),
        record(&clock, 1, TaskStatus::InProgress, TaskStatus::Blocked),
        record(&clock, 1, TaskStatus::Blocked, TaskStatus::InProgress),
    ];
    let other = record(&clock, 2, TaskStatus::ToDo, TaskStatus::Cancelled);

    let rt = test_runtime();
    for entry in &chain {
        rt.block_on(repo.append_transition(entry)).expect("append");
    }
    rt.block_on(repo.append_transition(&other))
        .expect("append other task");

    let loaded = rt
        .block_on(repo.load_transitions(&task(1)))
        .expect("load history");
    assert_eq!(loaded, chain);
    let found = rt
        .block_on(repo.find_transition(other.id()))
        .expect("find")
        .expect("record exists");
    assert_eq!(found, other);
    assert!(
        rt.block_on(repo.find_transition(TransitionRecordId::new()))
            .expect("find")
            .is_none()
    );
}

#[rstest]
fn stale_append_is_a_chain_conflict(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_stale_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let rt = test_runtime();
    rt.block_on(repo.append_transition(&record(
        &clock,
        1,
        TaskStatus::ToDo,
        TaskStatus::InProgress,
    )))
    .expect("first append");

    let stale = record(&clock, 1, TaskStatus::ToDo, TaskStatus::Cancelled);
    let result = rt.block_on(repo.append_transition(&stale));

    assert!(
        matches!(
            result,
            Err(TransitionRepositoryError::ChainConflict {
                expected: TaskStatus::InProgress,
                found: Some(TaskStatus::ToDo),
                ..
            })
        ),
        "expected chain conflict, got: {result:?}"
    );
    let loaded = rt.block_on(repo.load_transitions(&task(1))).expect("load");
    assert_eq!(loaded.len(), 1);
}

#[rstest]
fn first_record_must_leave_the_initial_status(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_first_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let rt = test_runtime();
    let result = rt.block_on(repo.append_transition(&record(
        &clock,
        1,
        TaskStatus::Blocked,
        TaskStatus::InProgress,
    )));

    assert!(matches!(
        result,
        Err(TransitionRepositoryError::ChainConflict {
            expected: TaskStatus::ToDo,
            ..
        })
    ));
}

#[rstest]
fn append_behind_pending_record_is_refused(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_pending_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let pending = pending_record(&clock, 1, TaskStatus::ToDo, TaskStatus::InProgress);
    let rt = test_runtime();
    rt.block_on(repo.append_transition(&pending))
        .expect("pending append");

    let follow_up = record(&clock, 1, TaskStatus::InProgress, TaskStatus::Blocked);
    let result = rt.block_on(repo.append_transition(&follow_up));

    assert!(
        matches!(
            result,
            Err(TransitionRepositoryError::ApprovalPending { pending: id, .. }) if id == pending.id()
        ),
        "expected pending approval refusal, got: {result:?}"
    );
}

#[rstest]
fn approval_is_stamped_exactly_once(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_approve_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let pending = pending_record(&clock, 1, TaskStatus::ToDo, TaskStatus::InProgress);
    let rt = test_runtime();
    rt.block_on(repo.append_transition(&pending))
        .expect("pending append");

    let approved_at = mockable::Clock::utc(&clock);
    let approved = rt
        .block_on(repo.record_approval(pending.id(), &actor("lead"), approved_at))
        .expect("approval");
    assert!(!approved.is_pending());
    assert_eq!(approved.approved_by(), Some(&actor("lead")));
    assert_eq!(approved.approved_at(), Some(approved_at));

    let stored = rt
        .block_on(repo.find_transition(pending.id()))
        .expect("find")
        .expect("record exists");
    assert_eq!(stored, approved);

    let again = rt.block_on(repo.record_approval(pending.id(), &actor("lead"), approved_at));
    assert!(matches!(again, Err(TransitionRepositoryError::NotPending(id)) if id == pending.id()));

    let missing = TransitionRecordId::new();
    let unknown = rt.block_on(repo.record_approval(missing, &actor("lead"), approved_at));
    assert!(matches!(unknown, Err(TransitionRepositoryError::NotFound(id)) if id == missing));

    rt.block_on(repo.append_transition(&record(
        &clock,
        1,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
    )))
    .expect("append after approval");
}

#[rstest]
fn reused_record_id_is_a_duplicate(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_duplicate_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let clock = SteppingClock::default();

    let first = record(&clock, 1, TaskStatus::ToDo, TaskStatus::InProgress);
    let rt = test_runtime();
    rt.block_on(repo.append_transition(&first))
        .expect("first append");

    let reused = TransitionRecord::from_persisted(PersistedTransitionRecord {
        id: first.id(),
        task: task(1),
        from_status: Some(TaskStatus::InProgress),
        to_status: TaskStatus::Blocked,
        actor: actor("agentA"),
        automated: false,
        trigger_kind: first.trigger_kind(),
        reason: None,
        occurred_at: mockable::Clock::utc(&clock),
        duration_in_previous_status: None,
        requires_approval: false,
        approved_by: None,
        approved_at: None,
    });
    let result = rt.block_on(repo.append_transition(&reused));

    assert!(
        matches!(result, Err(TransitionRepositoryError::DuplicateRecord(id)) if id == first.id()),
        "expected duplicate record, got: {result:?}"
    );
}

#[rstest]
fn racing_appends_on_one_task_commit_once(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_race_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 2).expect("repository setup");
    let clock = SteppingClock::default();

    let start = record(&clock, 1, TaskStatus::ToDo, TaskStatus::InProgress);
    let cancel = record(&clock, 1, TaskStatus::ToDo, TaskStatus::Cancelled);

    let rt = racing_runtime();
    let (left, right) = rt.block_on(async {
        tokio::join!(
            repo.append_transition(&start),
            repo.append_transition(&cancel)
        )
    });

    let outcomes = [left, right];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(TransitionRepositoryError::ChainConflict {
            expected: TaskStatus::InProgress | TaskStatus::Cancelled,
            found: Some(TaskStatus::ToDo),
            ..
        })
    )));
    let loaded = rt.block_on(repo.load_transitions(&task(1))).expect("load");
    assert_eq!(loaded.len(), 1);
}

#[rstest]
fn status_service_runs_on_postgres_history(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_history_service_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = transition_repository(shared_test_cluster, &db_name, 1).expect("repository setup");
    let service = StatusTransitionService::new(
        Arc::new(repo),
        Arc::new(InMemoryTaskRegistry::with_tasks([task(1)])),
        Arc::new(SteppingClock::default()),
    );

    let rt = test_runtime();
    rt.block_on(service.transition(TransitionRequest::new(
        task(1),
        TaskStatus::InProgress,
        actor("agentA"),
    )))
    .expect("start work");
    let pending = rt
        .block_on(service.transition(
            TransitionRequest::new(task(1), TaskStatus::PendingVerification, actor("agentA"))
                .requiring_approval(),
        ))
        .expect("request verification");

    assert_eq!(
        rt.block_on(service.current_status(&task(1))).expect("read"),
        TaskStatus::InProgress
    );

    rt.block_on(service.approve(pending.id(), actor("lead")))
        .expect("approve");

    assert_eq!(
        rt.block_on(service.current_status(&task(1))).expect("read"),
        TaskStatus::PendingVerification
    );
    let history = rt.block_on(service.history(&task(1))).expect("read");
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| !entry.is_pending()));
}
