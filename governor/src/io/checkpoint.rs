//! Checkpointing the governance machine into the state store.
//!
//! A checkpoint is an ordinary store document under `fsm_checkpoint_<name>`.
//! Writing one returns a receipt carrying the snapshot hash; restoring
//! requires that hash, so a tampered or truncated record never loads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::machine::RuntimeFsm;
use crate::core::state::RuntimeState;
use crate::core::transitions::CHECKPOINT_STATES;
use crate::error::{CheckpointError, GovernanceError, StoreError};
use crate::io::store::StateStore;

/// Persisted checkpoint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub checkpoint_name: String,
    pub current_state: RuntimeState,
    pub history: Vec<RuntimeState>,
    /// Pinned session time, never wall-clock, so replays hash identically.
    pub timestamp: String,
}

/// Where a checkpoint landed and what it hashed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointReceipt {
    pub key: String,
    pub hash: String,
}

/// Store key for checkpoint `name`.
pub fn checkpoint_key(name: &str) -> String {
    format!("fsm_checkpoint_{name}")
}

/// Persist `fsm` as checkpoint `name`.
///
/// Only allowed at the constitutional boundaries (`CAPTURE_AMU0`, `GATES`,
/// `CEO_FINAL_REVIEW`). A refused checkpoint leaves the machine untouched.
pub fn checkpoint_state(
    fsm: &RuntimeFsm,
    store: &StateStore,
    name: &str,
    timestamp: &str,
) -> Result<CheckpointReceipt, CheckpointError> {
    let state = fsm.current_state();
    if !CHECKPOINT_STATES.contains(&state) {
        warn!(%state, name, "checkpoint refused");
        return Err(GovernanceError::CheckpointNotAllowed { state }.into());
    }

    let record = CheckpointRecord {
        checkpoint_name: name.to_string(),
        current_state: state,
        history: fsm.history().to_vec(),
        timestamp: timestamp.to_string(),
    };
    let key = checkpoint_key(name);
    let document = match serde_json::to_value(&record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(StoreError::NotAnObject { key }.into()),
        Err(source) => return Err(StoreError::Encode { key, source }.into()),
    };

    store.write_state(&key, &document)?;
    let hash = store.create_snapshot(&key)?;
    info!(name, %state, %hash, "checkpoint written");
    Ok(CheckpointReceipt { key, hash })
}

/// Restore the machine saved as checkpoint `name`.
///
/// The stored snapshot must equal `expected_hash`, and the recorded history
/// must be a legal path ending in the recorded current state.
pub fn load_checkpoint(
    store: &StateStore,
    name: &str,
    expected_hash: &str,
    strict_mode: bool,
) -> Result<RuntimeFsm, CheckpointError> {
    let key = checkpoint_key(name);
    let actual = store.create_snapshot(&key)?;
    if actual != expected_hash {
        warn!(name, expected = expected_hash, %actual, "checkpoint hash mismatch");
        return Err(CheckpointError::HashMismatch {
            name: name.to_string(),
            expected: expected_hash.to_string(),
            actual,
        });
    }

    let document = store.read_state(&key)?;
    let record: CheckpointRecord = serde_json::from_value(Value::Object(document))
        .map_err(|source| CheckpointError::Malformed {
            name: name.to_string(),
            source,
        })?;

    if record.history.last() != Some(&record.current_state) {
        return Err(GovernanceError::InvalidHistory(format!(
            "history does not end in recorded state {}",
            record.current_state
        ))
        .into());
    }
    let fsm = RuntimeFsm::restore(record.history, strict_mode)?;
    debug!(name, state = %fsm.current_state(), "checkpoint loaded");
    Ok(fsm)
}
