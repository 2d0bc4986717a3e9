//! Orchestration services for task status transitions.

mod engine;
mod locks;

pub use engine::{
    StatusTransitionError, StatusTransitionResult, StatusTransitionService, TransitionRequest,
};
pub use locks::TaskLockRegistry;
