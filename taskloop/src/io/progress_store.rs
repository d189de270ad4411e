//! Progress record storage (`.taskloop/state.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::progress::ProgressState;
use crate::core::types::TaskDefinition;
use crate::errors::ConfigurationError;
use crate::io::atomic::write_json_atomic;

/// Load the progress record from disk.
///
/// A record that does not parse or lists a completed id twice is a
/// [`ConfigurationError`].
pub fn load_progress(path: &Path) -> Result<ProgressState> {
    debug!(path = %path.display(), "loading progress");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read progress {}", path.display()))?;
    let state: ProgressState = serde_json::from_str(&contents)
        .map_err(|err| ConfigurationError::single(path, format!("invalid progress record: {err}")))?;
    let dups = state.duplicate_completions();
    if !dups.is_empty() {
        return Err(ConfigurationError::single(
            path,
            format!("completedTasks lists ids more than once: {}", dups.join(", ")),
        )
        .into());
    }
    debug!(
        cycle_count = state.cycle_count,
        completed = state.completed_tasks.len(),
        "progress loaded"
    );
    Ok(state)
}

/// Load the progress record, or start a fresh one in `phase` if none exists.
pub fn load_or_default_progress(path: &Path, phase: &str) -> Result<ProgressState> {
    if path.exists() {
        return load_progress(path);
    }
    debug!(path = %path.display(), "no progress record, starting fresh");
    Ok(ProgressState::new(phase))
}

/// Atomically write the progress record (temp file + rename).
pub fn write_progress(path: &Path, state: &ProgressState) -> Result<()> {
    debug!(
        path = %path.display(),
        cycle_count = state.cycle_count,
        completed = state.completed_tasks.len(),
        "writing progress"
    );
    write_json_atomic(path, state)
}

/// Warn about completed ids the catalog no longer knows. They are kept as-is.
pub fn warn_unknown_completions(state: &ProgressState, catalog: &[TaskDefinition]) {
    for id in &state.completed_tasks {
        if !catalog.iter().any(|task| &task.id == id) {
            warn!(task_id = %id, "completed task is not in the catalog");
        }
    }
}
