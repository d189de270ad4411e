//! Read-only views for `taskloop select` and `taskloop status`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::core::rotation::next_worker;
use crate::core::scheduler::{Selection, select};
use crate::core::types::{Priority, WorkerId};
use crate::workspace::Workspace;

/// Structured selection outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The next cycle would dispatch this task.
    Next(SelectedTask),
    /// Every task is completed.
    Complete,
    /// Tasks remain but none is eligible.
    Blocked { remaining: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTask {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    /// `None` only when the roster is empty.
    pub worker: Option<WorkerId>,
}

/// Select from an already loaded workspace without side effects.
pub fn select_in(workspace: &Workspace) -> SelectOutcome {
    match select(&workspace.catalog, &workspace.progress) {
        Selection::Complete => SelectOutcome::Complete,
        Selection::Blocked { remaining } => SelectOutcome::Blocked { remaining },
        Selection::Next(task) => SelectOutcome::Next(SelectedTask {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            worker: next_worker(&workspace.config.workers, workspace.progress.last_worker),
        }),
    }
}

/// Load the workspace at `root` and report what the next cycle would pick.
pub fn select_from_root(root: &Path) -> Result<SelectOutcome> {
    let workspace = Workspace::load(root).context("load workspace for selection")?;
    Ok(select_in(&workspace))
}

/// Snapshot printed by `taskloop status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub phase: String,
    pub cycle_count: u64,
    pub completed: usize,
    pub total: usize,
    pub current_task: Option<String>,
    pub last_worker: Option<WorkerId>,
    pub last_run: Option<DateTime<Utc>>,
    pub next: SelectOutcome,
}

impl StatusReport {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let progress = &workspace.progress;
        let completed = workspace
            .catalog
            .iter()
            .filter(|task| progress.is_completed(&task.id))
            .count();
        Self {
            phase: progress.current_phase.clone(),
            cycle_count: progress.cycle_count,
            completed,
            total: workspace.catalog.len(),
            current_task: progress.current_task.clone(),
            last_worker: progress.last_worker,
            last_run: progress.last_run_timestamp,
            next: select_in(workspace),
        }
    }

    /// Human-readable lines, one fact per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("phase: {}\n", self.phase));
        out.push_str(&format!("cycles: {}\n", self.cycle_count));
        out.push_str(&format!("completed: {}/{}\n", self.completed, self.total));
        if let Some(task) = &self.current_task {
            out.push_str(&format!("retrying: {task}\n"));
        }
        out.push_str(&format!(
            "last worker: {}\n",
            self.last_worker.map_or("-", WorkerId::as_str)
        ));
        if let Some(ts) = self.last_run {
            out.push_str(&format!("last run: {}\n", ts.to_rfc3339()));
        }
        let next = match &self.next {
            SelectOutcome::Next(task) => match task.worker {
                Some(worker) => format!("{} ({})", task.id, worker),
                None => task.id.clone(),
            },
            SelectOutcome::Complete => "none, all tasks complete".to_string(),
            SelectOutcome::Blocked { remaining } => {
                format!("none, blocked: {}", remaining.join(", "))
            }
        };
        out.push_str(&format!("next: {next}\n"));
        out
    }
}

pub fn status_from_root(root: &Path) -> Result<StatusReport> {
    let workspace = Workspace::load(root).context("load workspace for status")?;
    Ok(StatusReport::from_workspace(&workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::ProgressState;
    use crate::io::config::LoopConfig;
    use crate::test_support::{progress_with, task};

    fn workspace(progress: ProgressState) -> Workspace {
        Workspace::from_parts(
            Path::new("/nonexistent"),
            LoopConfig::default(),
            vec![
                task("a", Priority::Low, &[]),
                task("b", Priority::High, &["a"]),
            ],
            progress,
        )
    }

    #[test]
    fn select_reports_task_and_next_worker() {
        let mut progress = progress_with(&["a"]);
        progress.last_worker = Some(WorkerId::Gemini);
        let outcome = select_in(&workspace(progress));
        assert_eq!(
            outcome,
            SelectOutcome::Next(SelectedTask {
                id: "b".to_string(),
                title: "b title".to_string(),
                priority: Priority::High,
                worker: Some(WorkerId::Codex),
            })
        );
    }

    #[test]
    fn select_reports_complete() {
        assert_eq!(
            select_in(&workspace(progress_with(&["a", "b"]))),
            SelectOutcome::Complete
        );
    }

    #[test]
    fn status_counts_only_known_completions() {
        let mut progress = progress_with(&["a", "retired"]);
        progress.cycle_count = 4;
        let report = StatusReport::from_workspace(&workspace(progress));
        assert_eq!(report.completed, 1);
        assert_eq!(report.total, 2);

        let text = report.render();
        assert!(text.contains("cycles: 4\n"));
        assert!(text.contains("completed: 1/2\n"));
        assert!(text.contains("last worker: -\n"));
        assert!(text.contains("next: b (gemini)\n"));
    }

    #[test]
    fn select_from_root_bootstraps_default_catalog() {
        let temp = tempfile::tempdir().expect("tempdir");
        let SelectOutcome::Next(selected) = select_from_root(temp.path()).expect("select") else {
            panic!("expected a selectable task");
        };
        assert_eq!(selected.id, "block-component");
        assert_eq!(selected.worker, Some(WorkerId::Gemini));
    }
}
