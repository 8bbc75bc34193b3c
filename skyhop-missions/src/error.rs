//! Error types for the mission engine.
//!
//! Data-integrity problems never escape the engine as errors; they are repaired in
//! place and reported through [`IntegrityIssue`] log lines. The typed errors below
//! cover catalog construction, configuration and raw storage access.

use std::fmt;
use thiserror::Error;

/// Errors raised while talking to the persistence collaborator.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("storage error for key `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to encode record for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MissionError {
    pub(crate) fn storage<E>(key: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            key: key.to_string(),
            source: Box::new(err),
        }
    }
}

/// Errors raised when a mission catalog violates its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("mission id must not be empty")]
    EmptyId,
    #[error("duplicate mission id `{0}`")]
    DuplicateId(String),
    #[error("mission `{id}` must have a positive target (got {target})")]
    NonPositiveTarget { id: String, target: i64 },
    #[error("mission `{id}` grants a non-positive currency reward ({amount})")]
    NonPositiveReward { id: String, amount: i64 },
    #[error("mission `{id}` unlocks an item with an empty id")]
    EmptyUnlockItem { id: String },
    #[error("catalog JSON is invalid: {0}")]
    Json(String),
}

/// Errors raised when engine configuration is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    EmptyKey { field: &'static str },
    #[error("{first} and {second} must use distinct keys (both `{key}`)")]
    KeyCollision {
        first: &'static str,
        second: &'static str,
        key: String,
    },
    #[error("{field} `{key}` overlaps {prefix_field} `{prefix}`")]
    OverlappingKeys {
        field: &'static str,
        key: String,
        prefix_field: &'static str,
        prefix: String,
    },
    #[error("config JSON is invalid: {0}")]
    Json(String),
}

/// Locally recovered integrity problems. These are logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A stored record could not be parsed and was replaced by zero defaults.
    PersistenceCorruption { key: String, detail: String },
    /// Stored progress fell outside `[0, target]` and was clamped.
    OutOfRangeProgress { id: String, stored: i64, target: i64 },
    /// A record was marked claimed without reaching its target.
    ClaimWithoutCompletion { id: String, stored: i64, target: i64 },
    /// A stored reset date could not be parsed and was treated as missing.
    MalformedResetDate { key: String, value: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersistenceCorruption { key, detail } => {
                write!(f, "discarding corrupt record `{key}`: {detail}")
            }
            Self::OutOfRangeProgress { id, stored, target } => {
                write!(f, "mission `{id}` progress {stored} outside 0..={target}, clamped")
            }
            Self::ClaimWithoutCompletion { id, stored, target } => write!(
                f,
                "mission `{id}` claimed at {stored}/{target}, progress raised to target"
            ),
            Self::MalformedResetDate { key, value } => {
                write!(f, "reset date `{key}` has unreadable value `{value}`")
            }
        }
    }
}

impl IntegrityIssue {
    pub(crate) fn report(&self) {
        log::warn!("{self}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_issue_messages_name_the_record() {
        let issue = IntegrityIssue::OutOfRangeProgress {
            id: "score_50".into(),
            stored: 90,
            target: 50,
        };
        let text = issue.to_string();
        assert!(text.contains("score_50"));
        assert!(text.contains("0..=50"));
    }

    #[test]
    fn storage_error_keeps_source() {
        let io = std::io::Error::other("disk full");
        let err = MissionError::storage("mission_a", io);
        assert!(err.to_string().contains("mission_a"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
