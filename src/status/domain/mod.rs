//! Domain model for task lifecycle status.
//!
//! Status is never stored directly: it is derived from the newest applied
//! [`TransitionRecord`] for a task, falling back to [`TaskStatus::INITIAL`].

mod error;
mod policy;
mod record;
mod status;
mod table;

pub use error::{ParseTaskStatusError, ParseTriggerKindError, StatusDomainError};
pub use policy::ApprovalPolicy;
pub use record::{
    Actor, PersistedTransitionRecord, TransitionDraft, TransitionRecord, TransitionRecordId,
    TriggerKind,
};
pub use status::TaskStatus;
pub use table::TransitionTable;
