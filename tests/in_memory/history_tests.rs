//! Audit trail and approval flow against the in-memory tracker.

use crate::in_memory::helpers::{TestTracker, actor, move_to, task, tracker, tracker_with};
use precedence::status::{
    domain::{ApprovalPolicy, StatusDomainError, TaskStatus, TriggerKind},
    services::StatusTransitionError,
};
use precedence::tracker::{TrackerConfig, TrackerError};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn history_is_restartable_and_oldest_first(tracker: TestTracker) {
    for status in [
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::InProgress,
    ] {
        tracker
            .transition(move_to(1, status))
            .await
            .expect("legal transition");
    }

    let first = tracker.history(&task(1)).await.expect("read");
    let second = tracker.history(&task(1)).await.expect("read");

    assert_eq!(first, second);
    let targets: Vec<_> = first.iter().map(|record| record.to_status()).collect();
    assert_eq!(
        targets,
        vec![
            TaskStatus::InProgress,
            TaskStatus::Blocked,
            TaskStatus::InProgress
        ]
    );
}

#[rstest]
#[tokio::test]
async fn timeout_transitions_are_automated(tracker: TestTracker) {
    let record = tracker
        .transition(
            move_to(1, TaskStatus::Cancelled)
                .with_trigger(TriggerKind::Timeout)
                .with_reason("stale for 30 days"),
        )
        .await
        .expect("legal transition");

    assert!(record.automated());
    assert_eq!(record.reason(), Some("stale for 30 days"));
}

#[rstest]
#[tokio::test]
async fn completed_tasks_are_immutable(tracker: TestTracker) {
    for status in [
        TaskStatus::InProgress,
        TaskStatus::PendingVerification,
        TaskStatus::VerificationComplete,
        TaskStatus::Completed,
    ] {
        tracker
            .transition(move_to(1, status))
            .await
            .expect("legal transition");
    }

    for target in TaskStatus::ALL {
        let result = tracker.transition(move_to(1, target)).await;

        assert!(
            matches!(
                result,
                Err(TrackerError::Status(StatusTransitionError::Domain(
                    StatusDomainError::TerminalState {
                        status: TaskStatus::Completed,
                        ..
                    }
                )))
            ),
            "completed -> {target} was not refused"
        );
    }
    assert_eq!(tracker.history(&task(1)).await.expect("read").len(), 4);
}

#[rstest]
#[tokio::test]
async fn cancelled_tasks_are_immutable(tracker: TestTracker) {
    tracker
        .transition(move_to(1, TaskStatus::InProgress))
        .await
        .expect("legal transition");
    tracker
        .transition(move_to(1, TaskStatus::Cancelled))
        .await
        .expect("legal transition");

    for target in TaskStatus::ALL {
        let result = tracker.transition(move_to(1, target)).await;

        assert!(
            matches!(
                result,
                Err(TrackerError::Status(StatusTransitionError::Domain(
                    StatusDomainError::TerminalState {
                        status: TaskStatus::Cancelled,
                        ..
                    }
                )))
            ),
            "cancelled -> {target} was not refused"
        );
    }
    assert_eq!(tracker.history(&task(1)).await.expect("read").len(), 2);
    assert_eq!(
        tracker.current_status(&task(1)).await.expect("read"),
        TaskStatus::Cancelled
    );
}

#[rstest]
#[tokio::test]
async fn policy_gated_completion_needs_approval() {
    let config = TrackerConfig {
        approval: ApprovalPolicy::requiring([TaskStatus::Completed]),
        ..TrackerConfig::default()
    };
    let tracker = tracker_with(2, config);
    for status in [
        TaskStatus::InProgress,
        TaskStatus::PendingVerification,
        TaskStatus::VerificationComplete,
        TaskStatus::Completed,
    ] {
        tracker
            .transition(move_to(1, status))
            .await
            .expect("legal transition");
    }
    let pending = tracker
        .pending_approval(&task(1))
        .await
        .expect("read")
        .expect("completion awaits approval");

    let blocked = tracker.transition(move_to(1, TaskStatus::InProgress)).await;
    assert!(matches!(
        blocked,
        Err(TrackerError::Status(
            StatusTransitionError::ApprovalAlreadyPending { .. }
        ))
    ));

    tracker
        .approve(pending.id(), actor("lead"))
        .await
        .expect("pending record");
    assert_eq!(
        tracker.current_status(&task(1)).await.expect("read"),
        TaskStatus::Completed
    );
    assert!(
        tracker
            .allowed_transitions(&task(1))
            .await
            .expect("read")
            .is_empty()
    );
}
