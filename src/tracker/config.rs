//! Tracker configuration.

use crate::status::domain::{ApprovalPolicy, TransitionTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or violates a table invariant.
    #[error("invalid tracker configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Lifecycle rules applied by the tracker.
///
/// Both sections are optional in serialized form and fall back to the
/// standard transition table and an empty approval policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Allowed status moves.
    #[serde(default)]
    pub transition_table: TransitionTable,
    /// Target statuses that need approval.
    #[serde(default)]
    pub approval: ApprovalPolicy,
}

impl TrackerConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for malformed JSON, unknown fields,
    /// unknown statuses, or a table giving a terminal status an outbound
    /// transition.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }
}
