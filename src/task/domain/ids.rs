//! Identifier and validated scalar types for task references.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project identifier owning a sequence of numbered tasks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Longest project identifier accepted by the persisted schema.
    const MAX_LENGTH: usize = 100;

    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidProjectId`] when the value is empty
    /// after trimming, contains whitespace or `/`, or exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized.chars().count() <= Self::MAX_LENGTH
            && !normalized
                .chars()
                .any(|ch| ch.is_whitespace() || ch == '/');

        if !is_valid {
            return Err(TaskDomainError::InvalidProjectId(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the project identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.0
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive per-project task sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TaskNumber(u64);

impl TaskNumber {
    /// Largest task number representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Creates a validated task number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the value is zero
    /// or exceeds the schema-backed maximum (`i64::MAX`).
    pub const fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TaskDomainError::InvalidTaskNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for TaskNumber {
    type Error = TaskDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskNumber> for u64 {
    fn from(value: TaskNumber) -> Self {
        value.0
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite identity of a task: its project plus sequence number.
///
/// Identities are only referenced here; allocation belongs to the task store.
/// The canonical text form is `project/number`, for example `P/1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskIdentity {
    project_id: ProjectId,
    task_number: TaskNumber,
}

impl TaskIdentity {
    /// Creates an identity from validated parts.
    #[must_use]
    pub const fn new(project_id: ProjectId, task_number: TaskNumber) -> Self {
        Self {
            project_id,
            task_number,
        }
    }

    /// Creates an identity from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when either part fails validation.
    pub fn from_parts(project_id: &str, task_number: u64) -> Result<Self, TaskDomainError> {
        Ok(Self::new(
            ProjectId::new(project_id)?,
            TaskNumber::new(task_number)?,
        ))
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the per-project task number.
    #[must_use]
    pub const fn task_number(&self) -> TaskNumber {
        self.task_number
    }
}

impl fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.task_number)
    }
}

impl FromStr for TaskIdentity {
    type Err = TaskDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || TaskDomainError::InvalidTaskReference(value.to_owned());
        let (project, number) = value.trim().rsplit_once('/').ok_or_else(invalid)?;
        let task_number = number.parse::<u64>().map_err(|_| invalid())?;
        Self::from_parts(project, task_number)
    }
}

impl TryFrom<&str> for TaskIdentity {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
