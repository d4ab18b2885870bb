//! Runtime governance machine with a deterministic state store.
//!
//! A governance session moves through a fixed lifecycle graph. Any illegal
//! move halts the session in `ERROR`; nothing leaves `ERROR`. Session state is
//! checkpointed into a store of canonical JSON documents whose SHA-256
//! snapshots let independent runs be compared byte-for-byte.
//!
//! - **[`core`]**: Pure, deterministic logic (states, transition table,
//!   machine, canonical encoding). No I/O.
//! - **[`io`]**: The state store, checkpoints, and config on disk.
//!
//! [`session`] ties both together behind an explicit, once-sealed context.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::machine::{RuntimeFsm, TransitionOutcome};
pub use crate::core::state::RuntimeState;
pub use crate::error::{CheckpointError, ContextError, GovernanceError, StoreError};
pub use crate::io::store::{Document, StateStore};
pub use crate::session::GovernanceContext;
