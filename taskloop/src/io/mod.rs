//! Side-effecting operations: filesystem records, git, and child processes.

pub mod atomic;
pub mod catalog_store;
pub mod commit;
pub mod config;
pub mod cycle_log;
pub mod executor;
pub mod git;
pub mod init;
pub mod paths;
pub mod process;
pub mod progress_store;
pub mod prompt;
