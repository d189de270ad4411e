//! Test-only builders and scripted collaborators.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use anyhow::{Result, anyhow};

use crate::core::progress::ProgressState;
use crate::core::types::{CommitOutcome, Priority, TaskDefinition, TaskKind, WorkerId};
use crate::io::catalog_store::write_catalog;
use crate::io::commit::Committer;
use crate::io::executor::{ExecRequest, Executor};
use crate::io::paths::LoopPaths;
use crate::workspace::Workspace;

/// A feature task with deterministic title/description and no targets.
pub fn task(id: &str, priority: Priority, dependencies: &[&str]) -> TaskDefinition {
    TaskDefinition {
        id: id.to_string(),
        kind: TaskKind::Feature,
        title: format!("{id} title"),
        description: format!("{id} description"),
        priority,
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        targets: Vec::new(),
    }
}

/// Default progress with the given ids already completed.
pub fn progress_with(completed: &[&str]) -> ProgressState {
    ProgressState {
        completed_tasks: completed.iter().map(|id| id.to_string()).collect(),
        ..ProgressState::default()
    }
}

/// Fresh temp root with `catalog` on disk, loaded back as a [`Workspace`].
///
/// Keep the returned `TempDir` alive for as long as the workspace is used.
pub fn temp_workspace(catalog: &[TaskDefinition]) -> (tempfile::TempDir, Workspace) {
    let temp = tempfile::tempdir().expect("tempdir");
    let paths = LoopPaths::new(temp.path());
    write_catalog(&paths.catalog_path, catalog).expect("write catalog");
    let workspace = Workspace::load(temp.path()).expect("load workspace");
    (temp, workspace)
}

/// `git init` plus an identity and one initial commit.
pub fn init_git_repo(root: &Path) {
    git(root, &["init"]);
    git(root, &["config", "user.email", "test@example.com"]);
    git(root, &["config", "user.name", "test"]);
    git(root, &["config", "commit.gpgsign", "false"]);
    fs::write(root.join("README.md"), "hi\n").expect("write README");
    git(root, &["add", "README.md"]);
    git(root, &["commit", "-m", "chore: init"]);
}

/// Subject line of the HEAD commit.
pub fn head_subject(root: &Path) -> String {
    git_stdout(root, &["log", "-1", "--format=%s"]).trim().to_string()
}

/// Paths changed by the HEAD commit, relative to the repository top level.
pub fn head_files(root: &Path) -> Vec<String> {
    git_stdout(root, &["show", "--name-only", "--format=", "HEAD"])
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn git_stdout(root: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .unwrap_or_else(|err| panic!("git {args:?}: {err}"));
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn git(root: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(root)
        .status()
        .unwrap_or_else(|err| panic!("git {args:?}: {err}"));
    assert!(status.success(), "git {args:?} failed");
}

/// One scripted executor response. Once the script runs out, every call succeeds.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Succeed,
    Fail(String),
    Panic(String),
}

/// Executor that replays a script and records every dispatch.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    steps: Mutex<VecDeque<ScriptStep>>,
    calls: Mutex<Vec<(String, WorkerId)>>,
}

impl ScriptedExecutor {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(task id, worker)` per dispatch, in order.
    pub fn calls(&self) -> Vec<(String, WorkerId)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, request: &ExecRequest) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request.task.id.clone(), request.worker));
        // Guard dropped before a scripted panic so the mutex stays clean.
        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(ScriptStep::Succeed);
        match step {
            ScriptStep::Succeed => Ok(()),
            ScriptStep::Fail(msg) => Err(anyhow!(msg)),
            ScriptStep::Panic(msg) => panic!("{msg}"),
        }
    }
}

/// Committer that records calls and optionally fails every one of them.
#[derive(Debug, Default)]
pub struct RecordingCommitter {
    failure: Option<String>,
    calls: Mutex<Vec<(String, WorkerId)>>,
}

impl RecordingCommitter {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, WorkerId)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Committer for RecordingCommitter {
    fn record_change(&self, task: &TaskDefinition, worker: WorkerId) -> Result<CommitOutcome> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((task.id.clone(), worker));
        match &self.failure {
            Some(msg) => Err(anyhow!(msg.clone())),
            None => Ok(CommitOutcome::Committed),
        }
    }
}
