//! Deterministic task selection over the catalog.

use crate::core::progress::ProgressState;
use crate::core::types::TaskDefinition;

/// Result of asking the scheduler for the next task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// An eligible task was picked.
    Next(&'a TaskDefinition),
    /// Every catalog task is completed.
    Complete,
    /// Tasks remain but none has all dependencies completed.
    Blocked { remaining: Vec<String> },
}

/// True if `task` is not completed and all of its dependencies are.
pub fn is_eligible(task: &TaskDefinition, progress: &ProgressState) -> bool {
    !progress.is_completed(&task.id)
        && task
            .dependencies
            .iter()
            .all(|dep| progress.is_completed(dep))
}

/// Eligible tasks in catalog order.
pub fn eligible_tasks<'a>(
    catalog: &'a [TaskDefinition],
    progress: &ProgressState,
) -> Vec<&'a TaskDefinition> {
    catalog
        .iter()
        .filter(|task| is_eligible(task, progress))
        .collect()
}

/// Pick the highest-priority eligible task; ties go to the first listed.
///
/// Returns `None` when nothing is eligible.
pub fn select_next<'a>(
    catalog: &'a [TaskDefinition],
    progress: &ProgressState,
) -> Option<&'a TaskDefinition> {
    let mut best: Option<&TaskDefinition> = None;
    for task in eligible_tasks(catalog, progress) {
        // Strict comparison keeps the earliest task on equal priority.
        if best.is_none_or(|current| task.priority > current.priority) {
            best = Some(task);
        }
    }
    best
}

/// Like [`select_next`], but tells "all done" apart from "permanently blocked".
pub fn select<'a>(catalog: &'a [TaskDefinition], progress: &ProgressState) -> Selection<'a> {
    if let Some(task) = select_next(catalog, progress) {
        return Selection::Next(task);
    }
    let remaining: Vec<String> = catalog
        .iter()
        .filter(|task| !progress.is_completed(&task.id))
        .map(|task| task.id.clone())
        .collect();
    if remaining.is_empty() {
        Selection::Complete
    } else {
        Selection::Blocked { remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Priority;
    use crate::test_support::{progress_with, task};

    fn example_catalog() -> Vec<TaskDefinition> {
        vec![
            task("a", Priority::High, &[]),
            task("b", Priority::High, &["a"]),
            task("c", Priority::Low, &[]),
        ]
    }

    #[test]
    fn picks_only_tasks_with_satisfied_dependencies() {
        let catalog = example_catalog();
        let progress = ProgressState::default();
        let eligible: Vec<&str> = eligible_tasks(&catalog, &progress)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(eligible, vec!["a", "c"]);
        assert_eq!(select_next(&catalog, &progress).map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn higher_priority_beats_catalog_order() {
        let catalog = example_catalog();
        let progress = progress_with(&["a"]);
        assert_eq!(select_next(&catalog, &progress).map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn equal_priority_ties_go_to_first_listed() {
        let catalog = vec![
            task("x", Priority::Medium, &[]),
            task("y", Priority::High, &[]),
            task("z", Priority::High, &[]),
        ];
        let progress = ProgressState::default();
        assert_eq!(select_next(&catalog, &progress).map(|t| t.id.as_str()), Some("y"));
    }

    #[test]
    fn selection_is_repeatable_for_identical_inputs() {
        let catalog = example_catalog();
        let progress = progress_with(&["a"]);
        let first = select_next(&catalog, &progress);
        for _ in 0..5 {
            assert_eq!(select_next(&catalog, &progress), first);
        }
    }

    #[test]
    fn complete_when_every_task_is_done() {
        let catalog = example_catalog();
        let progress = progress_with(&["a", "b", "c"]);
        assert_eq!(select_next(&catalog, &progress), None);
        assert_eq!(select(&catalog, &progress), Selection::Complete);
    }

    #[test]
    fn blocked_when_remaining_tasks_wait_on_missing_dependency() {
        // Unvalidated catalog: "b" references a task that no longer exists.
        let catalog = vec![task("a", Priority::High, &[]), task("b", Priority::Low, &["gone"])];
        let progress = progress_with(&["a"]);
        assert_eq!(
            select(&catalog, &progress),
            Selection::Blocked {
                remaining: vec!["b".to_string()]
            }
        );
    }

    #[test]
    fn never_selects_task_with_incomplete_dependency() {
        let catalog = vec![
            task("a", Priority::Low, &[]),
            task("b", Priority::High, &["a"]),
            task("c", Priority::High, &["a", "b"]),
        ];
        let mut progress = ProgressState::default();
        while let Some(next) = select_next(&catalog, &progress) {
            assert!(next.dependencies.iter().all(|d| progress.is_completed(d)));
            progress.completed_tasks.push(next.id.clone());
        }
        assert_eq!(progress.completed_tasks, vec!["a", "b", "c"]);
    }
}
