//! I/O for governance sessions: the state store, checkpoints, and config.

pub mod checkpoint;
pub mod config;
pub mod store;
