//! Shared deterministic types for the scheduling core.
//!
//! These types define stable contracts between core components and the
//! persisted records. They must not depend on external state or I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a task. Has no effect on scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Component,
    Feature,
    Test,
    Documentation,
    Refactor,
    Optimization,
    BugFix,
}

/// Task priority. Declaration order gives `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Interchangeable worker identity picked by rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerId {
    Gemini,
    Codex,
    Claude,
}

impl WorkerId {
    pub const ALL: [WorkerId; 3] = [WorkerId::Gemini, WorkerId::Codex, WorkerId::Claude];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerId::Gemini => "gemini",
            WorkerId::Codex => "codex",
            WorkerId::Claude => "claude",
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable catalog entry.
///
/// `kind` and `targets` also accept the legacy field names `type` and `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    #[serde(alias = "type")]
    pub kind: TaskKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Opaque resource locators handed to the executor uninterpreted.
    #[serde(default, alias = "files")]
    pub targets: Vec<String>,
}

/// How a dispatched task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecOutcome {
    Completed,
    Failed,
}

impl ExecOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// How the best-effort commit after a completed task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOutcome {
    Committed,
    Failed,
    /// No commit was attempted (the task failed).
    Skipped,
    /// The task completed but commits are turned off for this run.
    Disabled,
}

impl CommitOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Failed => "commit failed",
            Self::Skipped => "not committed",
            Self::Disabled => "commits disabled",
        }
    }
}
