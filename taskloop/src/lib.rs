//! Autonomous task-loop orchestrator.
//!
//! Repeatedly selects the highest-priority task whose dependencies are done,
//! hands it to the next worker in a fixed rotation, records the outcome in a
//! durable progress record, and paces cycles with a randomized delay.
//!
//! - **[`core`]**: Pure, deterministic logic (eligibility, selection, rotation,
//!   progress transitions, catalog validation). No I/O.
//! - **[`io`]**: Side-effecting operations (records on disk, git, processes).
//!
//! [`cycle`] runs a single select → dispatch → persist cycle and [`looping`]
//! repeats it with pacing and cancellation. [`select`] backs the read-only
//! CLI commands.

pub mod cancel;
pub mod catalog;
pub mod core;
pub mod cycle;
pub mod errors;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod pacing;
pub mod select;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workspace;
