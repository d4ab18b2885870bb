//! Static adjacency table for the governance machine.
//!
//! Legality is pure data: [`successors`] is the only source of truth, and
//! every check in this crate goes through it.

use std::collections::HashSet;

use crate::core::state::RuntimeState;
use crate::core::state::RuntimeState::{
    AmendmentExec, AmendmentPrep, AmendmentVerify, CaptureAmu0, CeoFinalReview, CeoReview,
    Complete, Error, FreezeActivated, FreezePrep, Gates, Init, MigrationSequence,
};

/// States that may only be entered when the machine runs in strict mode.
pub const STRICT_STATES: [RuntimeState; 3] = [FreezeActivated, CeoReview, CeoFinalReview];

/// States in which the machine may be checkpointed.
pub const CHECKPOINT_STATES: [RuntimeState; 3] = [CaptureAmu0, Gates, CeoFinalReview];

/// Legal successors of `from`.
///
/// The loops from `MIGRATION_SEQUENCE` and `GATES` back to `CAPTURE_AMU0` are
/// the only back-edges; both sinks have no successors.
pub fn successors(from: RuntimeState) -> &'static [RuntimeState] {
    match from {
        Init => &[AmendmentPrep, Error],
        AmendmentPrep => &[AmendmentExec, Error],
        AmendmentExec => &[AmendmentVerify, Error],
        AmendmentVerify => &[CeoReview, Error],
        CeoReview => &[FreezePrep, Error],
        FreezePrep => &[FreezeActivated, Error],
        FreezeActivated => &[CaptureAmu0, Error],
        CaptureAmu0 => &[MigrationSequence, Error],
        MigrationSequence => &[Gates, Error, CaptureAmu0],
        Gates => &[CeoFinalReview, Error, CaptureAmu0],
        CeoFinalReview => &[Complete, Error],
        Complete => &[],
        Error => &[],
    }
}

/// True if `(from, to)` is in the table.
pub fn is_legal(from: RuntimeState, to: RuntimeState) -> bool {
    successors(from).contains(&to)
}

/// True if entering `state` requires strict mode.
pub fn requires_strict(state: RuntimeState) -> bool {
    STRICT_STATES.contains(&state)
}

/// The canonical success path, `INIT` through `COMPLETE`, without loops.
pub fn happy_path() -> Vec<RuntimeState> {
    let mut path = vec![Init];
    let mut current = Init;
    while let Some(next) = successors(current).first().copied() {
        path.push(next);
        current = next;
    }
    path
}

/// Check that `history` is a path the machine could have recorded.
///
/// - Starts at `INIT`.
/// - Each consecutive pair is a legal edge.
/// - A step into `ERROR` is accepted from any state, `COMPLETE` and `ERROR`
///   included: every rejected call records one.
/// - Nothing but `ERROR` follows `ERROR`.
///
/// Returns stable error messages; empty means valid.
pub fn validate_path(history: &[RuntimeState]) -> Vec<String> {
    let mut errors = Vec::new();
    match history.first() {
        None => {
            errors.push("history is empty".to_string());
            return errors;
        }
        Some(&first) if first != Init => {
            errors.push(format!("history must start at {Init}, found {first}"));
        }
        Some(_) => {}
    }

    for (index, pair) in history.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        if to == Error {
            continue;
        }
        if !is_legal(from, to) {
            errors.push(format!("step {}: {} -> {} is not legal", index + 1, from, to));
        }
    }
    errors
}

/// Check the structural invariants of the table itself:
/// - Sinks have no successors, every other state has at least one.
/// - Every non-terminal state can halt into `ERROR`.
/// - Every state is reachable from `INIT`.
/// - The only cycles pass through `CAPTURE_AMU0`.
pub fn validate_table() -> Vec<String> {
    let mut errors = Vec::new();

    for state in RuntimeState::ALL {
        let next = successors(state);
        if state.is_terminal() && !next.is_empty() {
            errors.push(format!("{state}: terminal state has successors"));
        }
        if !state.is_terminal() && next.is_empty() {
            errors.push(format!("{state}: non-terminal state has no successors"));
        }
        if !state.is_terminal() && !next.contains(&Error) {
            errors.push(format!("{state}: missing edge to {Error}"));
        }
    }

    let reachable = reachable_from(Init, None);
    for state in RuntimeState::ALL {
        if !reachable.contains(&state) {
            errors.push(format!("{state}: unreachable from {Init}"));
        }
    }

    // With the loop target removed, the remaining graph must be acyclic.
    for state in RuntimeState::ALL {
        if state == CaptureAmu0 {
            continue;
        }
        let onward: HashSet<RuntimeState> = successors(state)
            .iter()
            .flat_map(|&next| reachable_from(next, Some(CaptureAmu0)))
            .collect();
        if onward.contains(&state) {
            errors.push(format!("{state}: cycle not passing through {CaptureAmu0}"));
        }
    }

    errors
}

fn reachable_from(start: RuntimeState, blocked: Option<RuntimeState>) -> HashSet<RuntimeState> {
    let mut seen = HashSet::new();
    if Some(start) == blocked {
        return seen;
    }
    let mut stack = vec![start];
    while let Some(state) = stack.pop() {
        if !seen.insert(state) {
            continue;
        }
        for &next in successors(state) {
            if Some(next) != blocked {
                stack.push(next);
            }
        }
    }
    seen
}
