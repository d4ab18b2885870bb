//! Test-only helpers for building machines, documents, and scratch stores.

use serde_json::Value;
use tempfile::TempDir;

use crate::core::machine::RuntimeFsm;
use crate::core::state::RuntimeState;
use crate::core::transitions::happy_path;
use crate::io::store::{Document, StateStore};

/// Strict machine driven along the happy path until it reaches `target`.
///
/// Panics if `target` is not on the happy path (i.e. `ERROR`).
pub fn fsm_at(target: RuntimeState) -> RuntimeFsm {
    let mut fsm = RuntimeFsm::new();
    for state in happy_path() {
        if fsm.current_state() == target {
            return fsm;
        }
        if state != RuntimeState::Init {
            fsm.transition_to(state).expect("happy path step");
        }
    }
    assert_eq!(fsm.current_state(), target, "{target} is not on the happy path");
    fsm
}

/// Unwrap a `json!` object literal into a store document.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

/// Store in a fresh temp directory. Keep the `TempDir` alive for the test.
pub fn scratch_store() -> (TempDir, StateStore) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = StateStore::open(temp.path().join("state")).expect("open store");
    (temp, store)
}
