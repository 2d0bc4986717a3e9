//! Port contracts for transition history storage.

mod repository;

pub use repository::{
    TransitionRepository, TransitionRepositoryError, TransitionRepositoryResult, verify_append,
};
