//! Immutable transition records forming a task's audit trail.

use super::{ParseTriggerKindError, StatusDomainError, TaskStatus};
use crate::task::domain::TaskIdentity;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a transition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionRecordId(Uuid);

impl TransitionRecordId {
    /// Generates a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TransitionRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransitionRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// A person requested the change.
    Manual,
    /// A rule or integration requested the change.
    Automatic,
    /// A timer expired.
    Timeout,
    /// An approval step produced the change.
    Approval,
}

impl TriggerKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
            Self::Timeout => "timeout",
            Self::Approval => "approval",
        }
    }

    /// Whether transitions with this trigger default to automated.
    #[must_use]
    pub const fn is_automated(self) -> bool {
        matches!(self, Self::Automatic | Self::Timeout)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TriggerKind {
    type Error = ParseTriggerKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "automatic" => Ok(Self::Automatic),
            "timeout" => Ok(Self::Timeout),
            "approval" => Ok(Self::Approval),
            _ => Err(ParseTriggerKindError(value.to_owned())),
        }
    }
}

/// Identifier of the person or system performing a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

impl Actor {
    /// Longest accepted actor identifier, in characters.
    pub const MAX_LENGTH: usize = 255;

    /// Creates a validated actor.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::EmptyActor`] when the trimmed value is
    /// empty and [`StatusDomainError::ActorTooLong`] when it exceeds
    /// [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, StatusDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StatusDomainError::EmptyActor);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(StatusDomainError::ActorTooLong {
                length,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the actor as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Actor {
    type Error = StatusDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Actor> for String {
    fn from(value: Actor) -> Self {
        value.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated content of a transition about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionDraft {
    /// Task changing status.
    pub task: TaskIdentity,
    /// Status the task is leaving.
    pub from_status: TaskStatus,
    /// Status the task is entering.
    pub to_status: TaskStatus,
    /// Who requested the change.
    pub actor: Actor,
    /// Whether a system rather than a person made the change.
    pub automated: bool,
    /// What caused the change.
    pub trigger_kind: TriggerKind,
    /// Free-form justification.
    pub reason: Option<String>,
    /// Whether the change waits for approval before taking effect.
    pub requires_approval: bool,
}

/// One entry of a task's status history.
///
/// Records are never edited, apart from the single approval stamp applied to
/// a pending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    id: TransitionRecordId,
    task: TaskIdentity,
    from_status: Option<TaskStatus>,
    to_status: TaskStatus,
    actor: Actor,
    automated: bool,
    trigger_kind: TriggerKind,
    reason: Option<String>,
    occurred_at: DateTime<Utc>,
    duration_in_previous_status: Option<TimeDelta>,
    requires_approval: bool,
    approved_by: Option<Actor>,
    approved_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTransitionRecord {
    /// Persisted identifier.
    pub id: TransitionRecordId,
    /// Persisted task identity.
    pub task: TaskIdentity,
    /// Persisted source status.
    pub from_status: Option<TaskStatus>,
    /// Persisted target status.
    pub to_status: TaskStatus,
    /// Persisted actor.
    pub actor: Actor,
    /// Persisted automation flag.
    pub automated: bool,
    /// Persisted trigger kind.
    pub trigger_kind: TriggerKind,
    /// Persisted reason.
    pub reason: Option<String>,
    /// Persisted creation timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Persisted time spent in the previous status.
    pub duration_in_previous_status: Option<TimeDelta>,
    /// Persisted approval requirement.
    pub requires_approval: bool,
    /// Persisted approver.
    pub approved_by: Option<Actor>,
    /// Persisted approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
}

impl TransitionRecord {
    /// Creates a record stamped with the current clock time.
    ///
    /// `previous_effective_at` is when the task entered its current status;
    /// the time since then is kept at millisecond precision.
    #[must_use]
    pub fn new(
        draft: TransitionDraft,
        previous_effective_at: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Self {
        let occurred_at = clock.utc();
        let duration_in_previous_status = previous_effective_at.map(|entered| {
            TimeDelta::milliseconds(occurred_at.signed_duration_since(entered).num_milliseconds())
        });

        Self {
            id: TransitionRecordId::new(),
            task: draft.task,
            from_status: Some(draft.from_status),
            to_status: draft.to_status,
            actor: draft.actor,
            automated: draft.automated,
            trigger_kind: draft.trigger_kind,
            reason: draft.reason,
            occurred_at,
            duration_in_previous_status,
            requires_approval: draft.requires_approval,
            approved_by: None,
            approved_at: None,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTransitionRecord) -> Self {
        Self {
            id: data.id,
            task: data.task,
            from_status: data.from_status,
            to_status: data.to_status,
            actor: data.actor,
            automated: data.automated,
            trigger_kind: data.trigger_kind,
            reason: data.reason,
            occurred_at: data.occurred_at,
            duration_in_previous_status: data.duration_in_previous_status,
            requires_approval: data.requires_approval,
            approved_by: data.approved_by,
            approved_at: data.approved_at,
        }
    }

    /// Returns a copy stamped as approved by `approver` at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::NotPendingApproval`] unless the record is
    /// awaiting approval.
    pub fn approved(&self, approver: Actor, at: DateTime<Utc>) -> Result<Self, StatusDomainError> {
        if !self.is_pending() {
            return Err(StatusDomainError::NotPendingApproval(self.id));
        }
        Ok(Self {
            approved_by: Some(approver),
            approved_at: Some(at),
            ..self.clone()
        })
    }

    /// Returns whether the record awaits approval.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.requires_approval && self.approved_by.is_none()
    }

    /// When the record's status took effect: approval time if approved,
    /// otherwise creation time.
    #[must_use]
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.approved_at.unwrap_or(self.occurred_at)
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TransitionRecordId {
        self.id
    }

    /// Returns the task identity.
    #[must_use]
    pub const fn task(&self) -> &TaskIdentity {
        &self.task
    }

    /// Returns the status the task left, when recorded.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the status the task entered.
    #[must_use]
    pub const fn to_status(&self) -> TaskStatus {
        self.to_status
    }

    /// Returns who requested the change.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns whether a system made the change.
    #[must_use]
    pub const fn automated(&self) -> bool {
        self.automated
    }

    /// Returns what caused the change.
    #[must_use]
    pub const fn trigger_kind(&self) -> TriggerKind {
        self.trigger_kind
    }

    /// Returns the justification, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns how long the task stayed in its previous status.
    #[must_use]
    pub const fn duration_in_previous_status(&self) -> Option<TimeDelta> {
        self.duration_in_previous_status
    }

    /// Returns whether the change needed approval.
    #[must_use]
    pub const fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    /// Returns the approver, once approved.
    #[must_use]
    pub const fn approved_by(&self) -> Option<&Actor> {
        self.approved_by.as_ref()
    }

    /// Returns the approval timestamp, once approved.
    #[must_use]
    pub const fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from_status.unwrap_or(TaskStatus::INITIAL);
        write!(f, "{}: {from} -> {} by {}", self.task, self.to_status, self.actor)?;
        if self.is_pending() {
            f.write_str(" (pending approval)")?;
        }
        Ok(())
    }
}
