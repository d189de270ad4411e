//! Per-cycle audit records under `.taskloop/cycles/`.
//!
//! Records are written after the progress record and are informational only;
//! nothing reads them back to make decisions.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{CommitOutcome, ExecOutcome, WorkerId};
use crate::io::atomic::write_json_atomic;
use crate::io::paths::LoopPaths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Cycle number after this cycle finished (matches `cycleCount`).
    pub cycle: u64,
    pub task_id: String,
    pub worker: WorkerId,
    pub outcome: ExecOutcome,
    /// Executor error text when `outcome` is `failed`.
    pub error: Option<String>,
    pub commit: CommitOutcome,
    pub commit_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
}

pub fn write_cycle_record(paths: &LoopPaths, record: &CycleRecord) -> Result<PathBuf> {
    let path = paths.cycle_record_path(record.cycle);
    write_json_atomic(&path, record)?;
    Ok(path)
}
