//! Executor abstraction for doing the work of a task.
//!
//! The [`Executor`] trait decouples the cycle from whatever actually performs a
//! task. The loop only observes `Ok` (completed) or `Err` (failed); side effects
//! are the executor's business. Tests use scripted executors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{TaskDefinition, WorkerId};
use crate::io::config::{ExecutorConfig, ExecutorKind};
use crate::io::process::run_with_deadline;

/// Everything an executor gets for one dispatch.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    pub task: TaskDefinition,
    pub worker: WorkerId,
    /// Descriptive text assembled from the task's title, description, and targets.
    pub brief: String,
    /// Project root the task's targets are relative to.
    pub workdir: PathBuf,
    /// Where an executor may leave its own log for this cycle.
    pub log_path: PathBuf,
}

/// Abstraction over task execution backends.
pub trait Executor {
    /// Perform the task. `Err` means the task stays incomplete.
    fn execute(&self, request: &ExecRequest) -> Result<()>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, request: &ExecRequest) -> Result<()> {
        (**self).execute(request)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, request: &ExecRequest) -> Result<()> {
        (**self).execute(request)
    }
}

/// Build the executor named by the config.
pub fn executor_from_config(cfg: &ExecutorConfig) -> Box<dyn Executor> {
    match cfg.kind {
        ExecutorKind::Placeholder => Box::new(PlaceholderExecutor),
        ExecutorKind::Command => Box::new(CommandExecutor {
            argv: cfg.command.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            output_limit_bytes: cfg.output_limit_bytes,
        }),
    }
}

/// Writes a stub for every target that does not exist yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExecutor;

impl Executor for PlaceholderExecutor {
    #[instrument(skip_all, fields(task_id = %request.task.id, worker = %request.worker))]
    fn execute(&self, request: &ExecRequest) -> Result<()> {
        for target in &request.task.targets {
            let path = resolve_target(&request.workdir, target)?;
            if path.exists() {
                debug!(path = %path.display(), "target exists, leaving untouched");
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create directory {}", parent.display()))?;
            }
            let stub = format!(
                "// TODO: Implement {}\n// Generated by {} agent\n// Task: {}\n",
                request.task.title, request.worker, request.task.description
            );
            fs::write(&path, stub).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote placeholder");
        }
        Ok(())
    }
}

/// Targets must stay inside the project root.
fn resolve_target(workdir: &Path, target: &str) -> Result<PathBuf> {
    let relative = Path::new(target);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        return Err(anyhow!("target '{target}' escapes the project root"));
    }
    Ok(workdir.join(relative))
}

/// Spawns an external agent command with the brief on stdin.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    /// Argv; `{worker}` and `{task}` are replaced per dispatch.
    pub argv: Vec<String>,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl CommandExecutor {
    fn command_for(&self, request: &ExecRequest) -> Result<Command> {
        let mut args = self.argv.iter().map(|arg| {
            arg.replace("{worker}", request.worker.as_str())
                .replace("{task}", &request.task.id)
        });
        let program = args
            .next()
            .ok_or_else(|| anyhow!("executor command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&request.workdir);
        Ok(cmd)
    }
}

impl Executor for CommandExecutor {
    #[instrument(skip_all, fields(task_id = %request.task.id, worker = %request.worker, timeout_secs = self.timeout.as_secs()))]
    fn execute(&self, request: &ExecRequest) -> Result<()> {
        info!(workdir = %request.workdir.display(), "starting executor command");
        let cmd = self.command_for(request)?;
        let run = run_with_deadline(
            cmd,
            Some(request.brief.clone().into_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .context("run executor command")?;

        if let Some(parent) = request.log_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log dir {}", parent.display()))?;
        }
        fs::write(&request.log_path, run.render_log())
            .with_context(|| format!("write executor log {}", request.log_path.display()))?;

        if run.timed_out {
            warn!("executor command timed out");
            return Err(anyhow!("executor timed out after {:?}", self.timeout));
        }
        if !run.succeeded() {
            warn!(exit_code = ?run.status.code(), "executor command failed");
            return Err(anyhow!(
                "executor exited with status {:?}",
                run.status.code()
            ));
        }
        debug!("executor command completed");
        Ok(())
    }
}
