//! Fail-closed governance state machine.
//!
//! Every call to [`RuntimeFsm::attempt`] appends exactly one entry to the
//! history. An illegal move does not roll back: the machine enters `ERROR`,
//! records it, and stays there for the rest of the session.

use tracing::{debug, warn};

use crate::core::state::RuntimeState;
use crate::core::transitions::{is_legal, requires_strict, validate_path};
use crate::error::GovernanceError;

/// Result of one transition attempt. The machine has already been updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The move was legal; `to` is now current.
    Advanced {
        from: RuntimeState,
        to: RuntimeState,
    },
    /// The move was rejected; the machine is now halted in `ERROR`.
    Halted(GovernanceError),
}

impl TransitionOutcome {
    pub fn into_result(self) -> Result<RuntimeState, GovernanceError> {
        match self {
            TransitionOutcome::Advanced { to, .. } => Ok(to),
            TransitionOutcome::Halted(err) => Err(err),
        }
    }
}

/// Runtime governance machine for a single session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFsm {
    current: RuntimeState,
    history: Vec<RuntimeState>,
    strict_mode: bool,
}

impl Default for RuntimeFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeFsm {
    /// Fresh machine at `INIT` with strict mode enabled.
    pub fn new() -> Self {
        Self::with_strict_mode(true)
    }

    /// Fresh machine at `INIT`. With `strict_mode` off, the review and freeze
    /// states are locked and entering them halts the machine.
    pub fn with_strict_mode(strict_mode: bool) -> Self {
        Self {
            current: RuntimeState::Init,
            history: vec![RuntimeState::Init],
            strict_mode,
        }
    }

    /// Rebuild a machine from a recorded history.
    ///
    /// The history must be a legal path from `INIT`, and must not enter a
    /// strict state unless `strict_mode` is on.
    pub fn restore(history: Vec<RuntimeState>, strict_mode: bool) -> Result<Self, GovernanceError> {
        let mut errors = validate_path(&history);
        if !strict_mode {
            errors.extend(
                history
                    .iter()
                    .filter(|state| requires_strict(**state))
                    .map(|state| format!("{state} requires strict mode")),
            );
        }
        if !errors.is_empty() {
            return Err(GovernanceError::InvalidHistory(errors.join("; ")));
        }
        let current = *history
            .last()
            .ok_or_else(|| GovernanceError::InvalidHistory("history is empty".to_string()))?;
        debug!(%current, entries = history.len(), "restored runtime machine");
        Ok(Self {
            current,
            history,
            strict_mode,
        })
    }

    pub fn current_state(&self) -> RuntimeState {
        self.current
    }

    /// Every state occupied so far, starting with `INIT`.
    pub fn history(&self) -> &[RuntimeState] {
        &self.history
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn is_halted(&self) -> bool {
        self.current == RuntimeState::Error
    }

    /// Move to `target`, returning the new state or the violation.
    pub fn transition_to(&mut self, target: RuntimeState) -> Result<RuntimeState, GovernanceError> {
        self.attempt(target).into_result()
    }

    /// Move to `target` and report what happened.
    pub fn attempt(&mut self, target: RuntimeState) -> TransitionOutcome {
        let from = self.current;
        if !is_legal(from, target) {
            return self.halt(GovernanceError::IllegalTransition { from, to: target });
        }
        if requires_strict(target) && !self.strict_mode {
            return self.halt(GovernanceError::StrictModeRequired { from, to: target });
        }

        self.current = target;
        self.history.push(target);
        debug!(%from, to = %target, "transition");
        TransitionOutcome::Advanced { from, to: target }
    }

    /// Halt unless the machine is in `expected`.
    pub fn assert_state(&mut self, expected: RuntimeState) -> Result<(), GovernanceError> {
        if self.current == expected {
            return Ok(());
        }
        let outcome = self.halt(GovernanceError::AssertionFailed {
            expected,
            actual: self.current,
        });
        outcome.into_result().map(|_| ())
    }

    fn halt(&mut self, err: GovernanceError) -> TransitionOutcome {
        warn!(from = %self.current, error = %err, "runtime halt");
        self.current = RuntimeState::Error;
        self.history.push(RuntimeState::Error);
        TransitionOutcome::Halted(err)
    }
}
