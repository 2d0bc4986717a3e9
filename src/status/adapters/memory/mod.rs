//! In-memory transition history for tests and embedded use.

mod history;

pub use history::InMemoryTransitionRepository;
