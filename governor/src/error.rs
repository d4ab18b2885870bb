//! Error signals raised by the governance machine and the state store.
//!
//! Each kind is its own type so orchestration code can tell a governance
//! violation from a missing document from an environment failure.

use std::io;
use std::path::PathBuf;

use crate::core::state::RuntimeState;

/// A governance invariant was violated. The machine is halted in `ERROR`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernanceError {
    #[error("invalid transition attempted: {from} -> {to}")]
    IllegalTransition { from: RuntimeState, to: RuntimeState },

    #[error("strict mode required for transition {from} -> {to}")]
    StrictModeRequired { from: RuntimeState, to: RuntimeState },

    #[error("state assertion failed: expected {expected}, got {actual}")]
    AssertionFailed {
        expected: RuntimeState,
        actual: RuntimeState,
    },

    #[error("checkpointing not allowed in state {state}")]
    CheckpointNotAllowed { state: RuntimeState },

    #[error("invalid history: {0}")]
    InvalidHistory(String),
}

impl GovernanceError {
    /// The `(from, to)` pair of a rejected transition, if this is one.
    pub fn transition(&self) -> Option<(RuntimeState, RuntimeState)> {
        match self {
            GovernanceError::IllegalTransition { from, to }
            | GovernanceError::StrictModeRequired { from, to } => Some((*from, *to)),
            _ => None,
        }
    }
}

/// Failures of the deterministic state store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state key '{key}' not found at {}", path.display())]
    NotFound { key: String, path: PathBuf },

    #[error("invalid state key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("malformed state '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("state '{key}' is not a JSON object")]
    NotAnObject { key: String },

    #[error("encode state '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Failures while checkpointing or restoring a machine.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("checkpoint '{name}' hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("checkpoint '{name}' record is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Misuse of the one-time governance context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("governance context already initialized (pinned at {pinned_time})")]
    AlreadyInitialized { pinned_time: String },

    #[error("governance context not initialized")]
    NotInitialized,

    #[error("pinned time must not be empty")]
    EmptyPinnedTime,
}
