//! Diesel row models for transition history persistence.

use super::schema::task_status_transitions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for transition records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_status_transitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionRow {
    /// Transition record identifier.
    pub id: uuid::Uuid,
    /// Project of the task.
    pub project_id: String,
    /// Task number within the project.
    pub task_number: i64,
    /// Status the task left.
    pub from_status: Option<String>,
    /// Status the task entered.
    pub to_status: String,
    /// Who requested the change.
    pub actor: String,
    /// Whether a system made the change.
    pub automated: bool,
    /// What caused the change.
    pub trigger_kind: String,
    /// Free-form justification.
    pub reason: Option<String>,
    /// Creation timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Milliseconds spent in the previous status.
    pub duration_in_previous_status_ms: Option<i64>,
    /// Whether the change needed approval.
    pub requires_approval: bool,
    /// Approver, once approved.
    pub approved_by: Option<String>,
    /// Approval timestamp, once approved.
    pub approved_at: Option<DateTime<Utc>>,
}

/// Insert model for transition records.
///
/// `position` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_status_transitions)]
pub struct NewTransitionRow {
    /// Transition record identifier.
    pub id: uuid::Uuid,
    /// Project of the task.
    pub project_id: String,
    /// Task number within the project.
    pub task_number: i64,
    /// Status the task left.
    pub from_status: Option<String>,
    /// Status the task entered.
    pub to_status: String,
    /// Who requested the change.
    pub actor: String,
    /// Whether a system made the change.
    pub automated: bool,
    /// What caused the change.
    pub trigger_kind: String,
    /// Free-form justification.
    pub reason: Option<String>,
    /// Creation timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Milliseconds spent in the previous status.
    pub duration_in_previous_status_ms: Option<i64>,
    /// Whether the change needed approval.
    pub requires_approval: bool,
    /// Approver, once approved.
    pub approved_by: Option<String>,
    /// Approval timestamp, once approved.
    pub approved_at: Option<DateTime<Utc>>,
}
