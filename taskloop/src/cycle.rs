//! One select → dispatch → persist cycle.
//!
//! Each call to [`CycleRunner::run_cycle`] walks
//! `Selecting → Dispatching → Completing | Failing → persisted`, or stops at
//! `Selecting` when nothing is eligible. Executor errors and panics are absorbed
//! into the cycle; only configuration and persistence problems escape.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use anyhow::{Result, anyhow};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::core::rotation::next_worker;
use crate::core::scheduler::{Selection, select};
use crate::core::types::{CommitOutcome, ExecOutcome, TaskDefinition, WorkerId};
use crate::errors::{ConfigurationError, PersistenceError};
use crate::io::commit::Committer;
use crate::io::cycle_log::{CycleRecord, write_cycle_record};
use crate::io::executor::{ExecRequest, Executor};
use crate::io::progress_store::write_progress;
use crate::io::prompt::render_brief;
use crate::workspace::Workspace;

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Every task is completed; nothing was dispatched or persisted.
    Drained,
    /// Tasks remain but none is eligible; nothing was dispatched or persisted.
    Blocked { remaining: Vec<String> },
    /// A task was dispatched and the outcome persisted.
    Ran(CycleSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// `cycleCount` after this cycle.
    pub cycle: u64,
    pub task_id: String,
    pub worker: WorkerId,
    pub outcome: ExecOutcome,
    pub error: Option<String>,
    pub commit: CommitOutcome,
}

/// Drives cycles against an owned [`Workspace`].
pub struct CycleRunner<E, C> {
    workspace: Workspace,
    executor: E,
    committer: C,
}

impl<E: Executor, C: Committer> CycleRunner<E, C> {
    pub fn new(workspace: Workspace, executor: E, committer: C) -> Self {
        Self {
            workspace,
            executor,
            committer,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// What the next cycle would select, without side effects.
    pub fn peek(&self) -> Selection<'_> {
        select(&self.workspace.catalog, &self.workspace.progress)
    }

    /// Run exactly one cycle.
    ///
    /// The in-memory progress only changes once the new record is on disk; a
    /// failed write returns a [`PersistenceError`] and leaves it untouched.
    #[instrument(skip_all, fields(cycle = self.workspace.progress.cycle_count + 1))]
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let task = match self.peek() {
            Selection::Complete => {
                info!("no tasks left, drained");
                return Ok(CycleReport::Drained);
            }
            Selection::Blocked { remaining } => {
                warn!(remaining = ?remaining, "tasks remain but none is eligible");
                return Ok(CycleReport::Blocked { remaining });
            }
            Selection::Next(task) => task.clone(),
        };

        let worker = next_worker(&self.workspace.config.workers, self.workspace.progress.last_worker)
            .ok_or_else(|| {
                ConfigurationError::single(
                    &self.workspace.paths.config_path,
                    "workers must list at least one worker",
                )
            })?;
        info!(task_id = %task.id, worker = %worker, priority = task.priority.as_str(), "dispatching task");

        let started_at = Utc::now();
        let start = Instant::now();
        let dispatched = self.dispatch(&task, worker);

        let mut next = self.workspace.progress.clone();
        let (outcome, error, commit, commit_error) = match dispatched {
            Ok(()) => {
                info!(task_id = %task.id, worker = %worker, "task completed");
                next.record_completion(&task.id, worker);
                match self.committer.record_change(&task, worker) {
                    Ok(commit) => (ExecOutcome::Completed, None, commit, None),
                    Err(err) => {
                        warn!(task_id = %task.id, err = %format!("{err:#}"), "commit failed");
                        (
                            ExecOutcome::Completed,
                            None,
                            CommitOutcome::Failed,
                            Some(format!("{err:#}")),
                        )
                    }
                }
            }
            Err(err) => {
                warn!(task_id = %task.id, worker = %worker, err = %format!("{err:#}"), "task failed, will retry on a later cycle");
                next.record_failure(&task.id);
                (
                    ExecOutcome::Failed,
                    Some(format!("{err:#}")),
                    CommitOutcome::Skipped,
                    None,
                )
            }
        };

        let ended_at = Utc::now();
        next.finish_cycle(ended_at);
        let path = &self.workspace.paths.progress_path;
        if let Err(cause) = write_progress(path, &next) {
            error!(path = %path.display(), "progress write failed, halting");
            return Err(PersistenceError {
                path: path.clone(),
                cycle: next.cycle_count,
                cause,
            }
            .into());
        }
        self.workspace.progress = next;

        let summary = CycleSummary {
            cycle: self.workspace.progress.cycle_count,
            task_id: task.id.clone(),
            worker,
            outcome,
            error,
            commit,
        };
        let record = CycleRecord {
            cycle: summary.cycle,
            task_id: summary.task_id.clone(),
            worker,
            outcome,
            error: summary.error.clone(),
            commit,
            commit_error,
            started_at,
            ended_at,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        if let Err(err) = write_cycle_record(&self.workspace.paths, &record) {
            warn!(err = %format!("{err:#}"), "failed to write cycle record");
        }

        info!(cycle = summary.cycle, outcome = ?summary.outcome, "cycle finished");
        Ok(CycleReport::Ran(summary))
    }

    /// Hand the task to the executor; any error or panic becomes `Err`.
    fn dispatch(&self, task: &TaskDefinition, worker: WorkerId) -> Result<()> {
        let request = ExecRequest {
            task: task.clone(),
            worker,
            brief: render_brief(task, worker)?,
            workdir: self.workspace.paths.root.clone(),
            log_path: self
                .workspace
                .paths
                .cycles_dir
                .join(format!("{}.executor.log", self.workspace.progress.cycle_count + 1)),
        };
        match catch_unwind(AssertUnwindSafe(|| self.executor.execute(&request))) {
            Ok(result) => result,
            Err(payload) => Err(anyhow!("executor panicked: {}", panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
