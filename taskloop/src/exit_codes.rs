//! Stable exit codes for taskloop CLI commands.

/// Command succeeded, a cycle ran, or a task is selectable.
pub const OK: i32 = 0;
/// Invalid catalog/config/progress record or any other error.
pub const INVALID: i32 = 1;
/// Every task is completed.
pub const COMPLETE: i32 = 2;
/// Tasks remain but none can become eligible.
pub const BLOCKED: i32 = 3;
/// `taskloop run` was interrupted by a shutdown signal.
pub const CANCELLED: i32 = 4;
/// The progress record could not be written; the loop halted.
pub const PERSISTENCE: i32 = 5;
