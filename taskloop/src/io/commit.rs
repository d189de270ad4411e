//! Commit collaborators invoked after a task completes.
//!
//! Failures here are reported back to the cycle, which logs them; they never
//! undo the completion.

use anyhow::{Result, anyhow};
use tracing::{info, instrument};

use crate::core::types::{CommitOutcome, TaskDefinition, WorkerId};
use crate::io::git::Git;

/// Records the change a completed task produced.
///
/// `Ok` carries what actually happened, so a disabled committer is not
/// mistaken for a commit.
pub trait Committer {
    fn record_change(&self, task: &TaskDefinition, worker: WorkerId) -> Result<CommitOutcome>;
}

impl<C: Committer + ?Sized> Committer for &C {
    fn record_change(&self, task: &TaskDefinition, worker: WorkerId) -> Result<CommitOutcome> {
        (**self).record_change(task, worker)
    }
}

impl<C: Committer + ?Sized> Committer for Box<C> {
    fn record_change(&self, task: &TaskDefinition, worker: WorkerId) -> Result<CommitOutcome> {
        (**self).record_change(task, worker)
    }
}

/// Commit message for a completed task.
pub fn commit_message(task: &TaskDefinition, worker: WorkerId) -> String {
    format!(
        "[{}] Implement {}\n\n{}",
        worker, task.title, task.description
    )
}

/// Stages everything under the project root and commits it.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    git: Git,
}

impl GitCommitter {
    pub fn new(git: Git) -> Self {
        Self { git }
    }
}

impl Committer for GitCommitter {
    #[instrument(skip_all, fields(task_id = %task.id, worker = %worker))]
    fn record_change(&self, task: &TaskDefinition, worker: WorkerId) -> Result<CommitOutcome> {
        self.git.add_all()?;
        if !self.git.commit_staged(&commit_message(task, worker))? {
            return Err(anyhow!("nothing to commit for task {}", task.id));
        }
        info!("committed task changes");
        Ok(CommitOutcome::Committed)
    }
}

/// Used when commits are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommitter;

impl Committer for NoopCommitter {
    fn record_change(&self, _task: &TaskDefinition, _worker: WorkerId) -> Result<CommitOutcome> {
        Ok(CommitOutcome::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Priority;
    use crate::test_support::{head_files, head_subject, init_git_repo, task};
    use std::fs;

    #[test]
    fn message_names_worker_title_and_description() {
        let t = task("graph", Priority::High, &[]);
        assert_eq!(
            commit_message(&t, WorkerId::Claude),
            "[claude] Implement graph title\n\ngraph description"
        );
    }

    #[test]
    fn git_committer_commits_and_reports_empty_changes() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_git_repo(temp.path());
        let committer = GitCommitter::new(Git::new(temp.path()));
        let t = task("graph", Priority::High, &[]);

        fs::write(temp.path().join("graph.tsx"), "x").expect("write");
        let outcome = committer
            .record_change(&t, WorkerId::Codex)
            .expect("commit");
        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(head_subject(temp.path()), "[codex] Implement graph title");

        let err = committer
            .record_change(&t, WorkerId::Codex)
            .expect_err("nothing left to commit");
        assert!(err.to_string().contains("nothing to commit"));
    }

    #[test]
    fn git_committer_leaves_files_outside_the_root_alone() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_git_repo(temp.path());
        let project = temp.path().join("project");
        fs::create_dir_all(&project).expect("mkdir");
        fs::write(project.join("inside.ts"), "x").expect("write");
        fs::write(temp.path().join("unrelated.secret"), "token").expect("write");

        let committer = GitCommitter::new(Git::new(&project));
        committer
            .record_change(&task("inside", Priority::High, &[]), WorkerId::Gemini)
            .expect("commit");

        let files = head_files(temp.path());
        assert!(files.iter().any(|f| f.ends_with("inside.ts")));
        assert!(!files.iter().any(|f| f.contains("unrelated.secret")));
    }

    #[test]
    fn noop_committer_reports_disabled() {
        let outcome = NoopCommitter
            .record_change(&task("graph", Priority::High, &[]), WorkerId::Claude)
            .expect("noop");
        assert_eq!(outcome, CommitOutcome::Disabled);
    }
}
