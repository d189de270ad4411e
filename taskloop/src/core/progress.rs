//! Progress record and the pure transitions applied to it once per cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::WorkerId;

/// The only mutable, persisted entity (`.taskloop/state.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    /// Completion time of the most recent cycle.
    pub last_run_timestamp: Option<DateTime<Utc>>,
    /// Free-text project phase, carried through untouched.
    pub current_phase: String,
    /// Completed task ids in completion order.
    pub completed_tasks: Vec<String>,
    /// Task selected by the last cycle but not confirmed complete.
    pub current_task: Option<String>,
    /// Worker that handled the most recent completed task.
    pub last_worker: Option<WorkerId>,
    pub cycle_count: u64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new("implementation")
    }
}

impl ProgressState {
    pub fn new(phase: &str) -> Self {
        Self {
            last_run_timestamp: None,
            current_phase: phase.to_string(),
            completed_tasks: Vec::new(),
            current_task: None,
            last_worker: None,
            cycle_count: 0,
        }
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed_tasks.iter().any(|id| id == task_id)
    }

    /// Ids listed more than once in `completed_tasks`, in first-repeat order.
    pub fn duplicate_completions(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for id in &self.completed_tasks {
            if !seen.insert(id.as_str()) && !dups.contains(id) {
                dups.push(id.clone());
            }
        }
        dups
    }

    /// Apply the `Completing` transition: mark done, remember the worker.
    pub fn record_completion(&mut self, task_id: &str, worker: WorkerId) {
        if !self.is_completed(task_id) {
            self.completed_tasks.push(task_id.to_string());
        }
        self.last_worker = Some(worker);
        self.current_task = None;
    }

    /// Apply the `Failing` transition: remember the attempted task only.
    pub fn record_failure(&mut self, task_id: &str) {
        self.current_task = Some(task_id.to_string());
    }

    /// Bookkeeping shared by both outcomes.
    pub fn finish_cycle(&mut self, now: DateTime<Utc>) {
        self.cycle_count += 1;
        self.last_run_timestamp = Some(now);
    }
}
