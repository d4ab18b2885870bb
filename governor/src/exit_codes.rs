//! Stable exit codes for governor CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Usage, config, or environment failure.
pub const INVALID: i32 = 1;
/// A governance violation halted the machine.
pub const VIOLATION: i32 = 2;
/// The requested state key does not exist.
pub const NOT_FOUND: i32 = 3;
/// `governor verify` computed a different snapshot hash.
pub const MISMATCH: i32 = 4;
