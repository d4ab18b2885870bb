//! Lifecycle states of a governance session.
//!
//! The set is closed: every persisted history, CLI argument, and checkpoint
//! record names one of these variants by its SCREAMING_SNAKE_CASE name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One state of the runtime governance machine.
///
/// Declaration order follows the canonical happy path from [`Init`] to
/// [`Complete`]; [`Error`] is the failure sink.
///
/// [`Init`]: RuntimeState::Init
/// [`Complete`]: RuntimeState::Complete
/// [`Error`]: RuntimeState::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeState {
    Init,
    AmendmentPrep,
    AmendmentExec,
    AmendmentVerify,
    CeoReview,
    FreezePrep,
    FreezeActivated,
    CaptureAmu0,
    MigrationSequence,
    Gates,
    CeoFinalReview,
    /// Success sink.
    Complete,
    /// Failure sink. Nothing leaves it.
    Error,
}

impl RuntimeState {
    /// Every state, in declaration order.
    pub const ALL: [RuntimeState; 13] = [
        RuntimeState::Init,
        RuntimeState::AmendmentPrep,
        RuntimeState::AmendmentExec,
        RuntimeState::AmendmentVerify,
        RuntimeState::CeoReview,
        RuntimeState::FreezePrep,
        RuntimeState::FreezeActivated,
        RuntimeState::CaptureAmu0,
        RuntimeState::MigrationSequence,
        RuntimeState::Gates,
        RuntimeState::CeoFinalReview,
        RuntimeState::Complete,
        RuntimeState::Error,
    ];

    /// Stable wire name (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeState::Init => "INIT",
            RuntimeState::AmendmentPrep => "AMENDMENT_PREP",
            RuntimeState::AmendmentExec => "AMENDMENT_EXEC",
            RuntimeState::AmendmentVerify => "AMENDMENT_VERIFY",
            RuntimeState::CeoReview => "CEO_REVIEW",
            RuntimeState::FreezePrep => "FREEZE_PREP",
            RuntimeState::FreezeActivated => "FREEZE_ACTIVATED",
            RuntimeState::CaptureAmu0 => "CAPTURE_AMU0",
            RuntimeState::MigrationSequence => "MIGRATION_SEQUENCE",
            RuntimeState::Gates => "GATES",
            RuntimeState::CeoFinalReview => "CEO_FINAL_REVIEW",
            RuntimeState::Complete => "COMPLETE",
            RuntimeState::Error => "ERROR",
        }
    }

    /// True for the two sinks, `COMPLETE` and `ERROR`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RuntimeState::Complete | RuntimeState::Error)
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`RuntimeState`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown runtime state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for RuntimeState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuntimeState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_and_serde_agree() {
        for state in RuntimeState::ALL {
            let json = serde_json::to_string(&state).expect("serialize");
            assert_eq!(json, format!("\"{}\"", state.as_str()));
            assert_eq!(state.to_string().parse::<RuntimeState>(), Ok(state));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "REPLAY".parse::<RuntimeState>().unwrap_err();
        assert_eq!(err, UnknownState("REPLAY".to_string()));
        assert!("init".parse::<RuntimeState>().is_err());
    }

    #[test]
    fn only_sinks_are_terminal() {
        let terminal: Vec<_> = RuntimeState::ALL
            .into_iter()
            .filter(|state| state.is_terminal())
            .collect();
        assert_eq!(terminal, vec![RuntimeState::Complete, RuntimeState::Error]);
    }
}
