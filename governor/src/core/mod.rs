//! Deterministic, pure governance logic.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod canonical;
pub mod machine;
pub mod state;
pub mod transitions;
