//! Typed errors that decide whether the loop halts.
//!
//! Plumbing returns `anyhow::Error`; these types ride inside it and callers
//! classify them with `downcast_ref`.

use std::path::PathBuf;

/// Malformed catalog, config, or progress record. Fatal at load time.
#[derive(Debug, thiserror::Error)]
#[error("configuration error in {}: {}", path.display(), problems.join("; "))]
pub struct ConfigurationError {
    pub path: PathBuf,
    pub problems: Vec<String>,
}

impl ConfigurationError {
    pub fn new(path: impl Into<PathBuf>, problems: Vec<String>) -> Self {
        Self {
            path: path.into(),
            problems,
        }
    }

    pub fn single(path: impl Into<PathBuf>, problem: impl Into<String>) -> Self {
        Self::new(path, vec![problem.into()])
    }
}

/// The progress record could not be written atomically. Fatal for the run.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist progress after cycle {cycle} to {}: {cause:#}", path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    pub cycle: u64,
    pub cause: anyhow::Error,
}

/// True if `err` carries a [`ConfigurationError`] anywhere in its chain.
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<ConfigurationError>().is_some())
}

/// True if `err` carries a [`PersistenceError`] anywhere in its chain.
pub fn is_persistence_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<PersistenceError>().is_some())
}
