//! Dependency edges and their type tags.

use super::DependencyDomainError;
use crate::task::domain::TaskIdentity;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open, validated tag describing how two tasks relate in time.
///
/// Any `snake_case` tag is accepted so new relation kinds can be introduced
/// without a schema change. Tags are folded to lowercase, so `FINISH_TO_START`
/// and `finish_to_start` name the same relation. The well-known tags have
/// constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencyType(String);

impl DependencyType {
    /// Longest tag accepted by the persisted schema.
    const MAX_LENGTH: usize = 50;

    /// Tag for "predecessor must finish before successor starts".
    pub const FINISH_TO_START: &'static str = "finish_to_start";
    /// Tag for "predecessor must start before successor starts".
    pub const START_TO_START: &'static str = "start_to_start";
    /// Tag for "predecessor must finish before successor finishes".
    pub const FINISH_TO_FINISH: &'static str = "finish_to_finish";
    /// Tag for "predecessor must start before successor finishes".
    pub const START_TO_FINISH: &'static str = "start_to_finish";

    /// Creates a validated dependency type.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyDomainError::InvalidDependencyType`] when the
    /// trimmed value is empty, longer than 50 characters, or contains
    /// characters outside `[a-z0-9_]` after lowercasing.
    pub fn new(value: impl Into<String>) -> Result<Self, DependencyDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let is_valid = !normalized.is_empty()
            && normalized.len() <= Self::MAX_LENGTH
            && normalized
                .bytes()
                .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_');

        if !is_valid {
            return Err(DependencyDomainError::InvalidDependencyType(raw));
        }

        Ok(Self(normalized))
    }

    /// The `finish_to_start` tag.
    #[must_use]
    pub fn finish_to_start() -> Self {
        Self(Self::FINISH_TO_START.to_owned())
    }

    /// The `start_to_start` tag.
    #[must_use]
    pub fn start_to_start() -> Self {
        Self(Self::START_TO_START.to_owned())
    }

    /// The `finish_to_finish` tag.
    #[must_use]
    pub fn finish_to_finish() -> Self {
        Self(Self::FINISH_TO_FINISH.to_owned())
    }

    /// The `start_to_finish` tag.
    #[must_use]
    pub fn start_to_finish() -> Self {
        Self(Self::START_TO_FINISH.to_owned())
    }

    /// Returns whether this is the `finish_to_start` tag.
    #[must_use]
    pub fn is_finish_to_start(&self) -> bool {
        self.0 == Self::FINISH_TO_START
    }

    /// Returns the tag as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DependencyType {
    type Error = DependencyDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DependencyType {
    type Error = DependencyDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DependencyType> for String {
    fn from(value: DependencyType) -> Self {
        value.0
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directed precedence link: `predecessor` must precede `successor`.
///
/// Edges are never mutated; changing the type means removing the edge and
/// adding a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    predecessor: TaskIdentity,
    successor: TaskIdentity,
    dependency_type: DependencyType,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDependencyEdge {
    /// Persisted predecessor identity.
    pub predecessor: TaskIdentity,
    /// Persisted successor identity.
    pub successor: TaskIdentity,
    /// Persisted dependency type.
    pub dependency_type: DependencyType,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Creates a new edge stamped with the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyDomainError::SelfDependency`] when both endpoints
    /// are the same task.
    pub fn new(
        predecessor: TaskIdentity,
        successor: TaskIdentity,
        dependency_type: DependencyType,
        clock: &impl Clock,
    ) -> Result<Self, DependencyDomainError> {
        if predecessor == successor {
            return Err(DependencyDomainError::SelfDependency(predecessor));
        }

        Ok(Self {
            predecessor,
            successor,
            dependency_type,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an edge from persisted storage.
    ///
    /// Storage is trusted here: a self-loop in corrupt data is loaded as-is so
    /// the graph can report it instead of silently dropping it.
    #[must_use]
    pub fn from_persisted(data: PersistedDependencyEdge) -> Self {
        Self {
            predecessor: data.predecessor,
            successor: data.successor,
            dependency_type: data.dependency_type,
            created_at: data.created_at,
        }
    }

    /// Returns the task that must come first.
    #[must_use]
    pub const fn predecessor(&self) -> &TaskIdentity {
        &self.predecessor
    }

    /// Returns the task that must come after.
    #[must_use]
    pub const fn successor(&self) -> &TaskIdentity {
        &self.successor
    }

    /// Returns the dependency type tag.
    #[must_use]
    pub const fn dependency_type(&self) -> &DependencyType {
        &self.dependency_type
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.predecessor, self.successor, self.dependency_type
        )
    }
}
