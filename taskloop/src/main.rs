//! Autonomous task-loop orchestrator.
//!
//! Keeps its records under `.taskloop/` in the project root: the task catalog,
//! the progress record, the config, and one record per cycle.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use taskloop::cancel::CancelToken;
use taskloop::cycle::{CycleReport, CycleRunner, CycleSummary};
use taskloop::errors::is_persistence_error;
use taskloop::exit_codes;
use taskloop::io::commit::{Committer, GitCommitter, NoopCommitter};
use taskloop::io::executor::{Executor, executor_from_config};
use taskloop::io::git::Git;
use taskloop::io::init::{InitOptions, init_loop};
use taskloop::logging;
use taskloop::looping::{LoopOptions, LoopOutcome, LoopStop, run_loop};
use taskloop::pacing::{FixedPacing, Pacing, UniformPacing};
use taskloop::select::{SelectOutcome, select_from_root, status_from_root};
use taskloop::workspace::Workspace;

#[derive(Parser)]
#[command(
    name = "taskloop",
    version,
    about = "Autonomous task loop: dependency-aware selection with rotating workers"
)]
struct Cli {
    /// Project root containing `.taskloop/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.taskloop/` with the default catalog, config, and progress.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check catalog, config, and progress records.
    Validate,
    /// Print the id of the task the next cycle would pick.
    Select,
    /// Print progress and the next selection.
    Status,
    /// Run exactly one cycle, without pacing.
    Once,
    /// Run cycles until drained, blocked, or interrupted.
    Run {
        /// Stop after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,
        /// Skip the delay between cycles.
        #[arg(long)]
        no_wait: bool,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            if is_persistence_error(&err) {
                exit_codes::PERSISTENCE
            } else {
                exit_codes::INVALID
            }
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = cli.root.as_path();
    match cli.command {
        Command::Init { force } => cmd_init(root, force),
        Command::Validate => cmd_validate(root),
        Command::Select => cmd_select(root),
        Command::Status => cmd_status(root),
        Command::Once => cmd_once(root),
        Command::Run {
            max_cycles,
            no_wait,
        } => cmd_run(root, max_cycles, no_wait),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_loop(root, &InitOptions { force })?;
    println!("initialized {}", paths.loop_dir.display());
    Ok(exit_codes::OK)
}

fn cmd_validate(root: &Path) -> Result<i32> {
    let ws = Workspace::load(root)?;
    println!(
        "ok: {} tasks, {} completed, {} workers",
        ws.catalog.len(),
        ws.progress.completed_tasks.len(),
        ws.config.workers.len()
    );
    Ok(exit_codes::OK)
}

fn cmd_select(root: &Path) -> Result<i32> {
    Ok(match select_from_root(root)? {
        SelectOutcome::Next(task) => {
            println!("{}", task.id);
            exit_codes::OK
        }
        SelectOutcome::Complete => {
            eprintln!("all tasks complete");
            exit_codes::COMPLETE
        }
        SelectOutcome::Blocked { remaining } => {
            eprintln!("blocked: {}", remaining.join(", "));
            exit_codes::BLOCKED
        }
    })
}

fn cmd_status(root: &Path) -> Result<i32> {
    print!("{}", status_from_root(root)?.render());
    Ok(exit_codes::OK)
}

fn cmd_once(root: &Path) -> Result<i32> {
    let mut runner = build_runner(root)?;
    Ok(match runner.run_cycle()? {
        CycleReport::Drained => {
            eprintln!("all tasks complete");
            exit_codes::COMPLETE
        }
        CycleReport::Blocked { remaining } => {
            eprintln!("blocked: {}", remaining.join(", "));
            exit_codes::BLOCKED
        }
        CycleReport::Ran(summary) => {
            print_summary(&summary);
            exit_codes::OK
        }
    })
}

fn cmd_run(root: &Path, max_cycles: Option<u64>, no_wait: bool) -> Result<i32> {
    let mut runner = build_runner(root)?;
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("shutdown requested, stopping after the current cycle");
        handler_token.cancel();
    })
    .context("install signal handler")?;

    let options = LoopOptions { max_cycles };
    let outcome = if no_wait {
        drive(&mut runner, FixedPacing(std::time::Duration::ZERO), &cancel, &options)?
    } else {
        let (min, max) = runner.workspace().config.pacing.window();
        drive(&mut runner, UniformPacing::new(min, max), &cancel, &options)?
    };

    println!("{} cycles run", outcome.cycles_run);
    Ok(match outcome.stop {
        LoopStop::Drained => {
            println!("all tasks complete");
            exit_codes::COMPLETE
        }
        LoopStop::Blocked { remaining } => {
            eprintln!("blocked: {}", remaining.join(", "));
            exit_codes::BLOCKED
        }
        LoopStop::Cancelled => exit_codes::CANCELLED,
        LoopStop::MaxCyclesReached { .. } => exit_codes::OK,
    })
}

fn drive<P: Pacing>(
    runner: &mut CycleRunner<Box<dyn Executor>, Box<dyn Committer>>,
    mut pacing: P,
    cancel: &CancelToken,
    options: &LoopOptions,
) -> Result<LoopOutcome> {
    run_loop(runner, &mut pacing, cancel, options, print_summary)
}

fn build_runner(root: &Path) -> Result<CycleRunner<Box<dyn Executor>, Box<dyn Committer>>> {
    let ws = Workspace::load(root)?;
    let executor = executor_from_config(&ws.config.executor);
    let committer = committer_for(&ws);
    Ok(CycleRunner::new(ws, executor, committer))
}

fn committer_for(ws: &Workspace) -> Box<dyn Committer> {
    if !ws.config.commit.enabled {
        info!("commits disabled by config");
        return Box::new(NoopCommitter);
    }
    let git = Git::new(&ws.paths.root);
    match git.is_repo() {
        Ok(true) => Box::new(GitCommitter::new(git)),
        Ok(false) => {
            warn!(root = %ws.paths.root.display(), "not a git repository, commits skipped");
            Box::new(NoopCommitter)
        }
        Err(err) => {
            warn!(err = %format!("{err:#}"), "git unavailable, commits skipped");
            Box::new(NoopCommitter)
        }
    }
}

fn print_summary(summary: &CycleSummary) {
    match &summary.error {
        Some(err) => println!(
            "cycle {}: {} by {}: {} ({})",
            summary.cycle,
            summary.task_id,
            summary.worker,
            summary.outcome.as_str(),
            err
        ),
        None => println!(
            "cycle {}: {} by {}: {}, {}",
            summary.cycle,
            summary.task_id,
            summary.worker,
            summary.outcome.as_str(),
            summary.commit.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["taskloop", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn parse_run_flags_and_global_root() {
        let cli = Cli::parse_from([
            "taskloop",
            "run",
            "--max-cycles",
            "3",
            "--no-wait",
            "--root",
            "/tmp/project",
        ]);
        assert!(matches!(
            cli.command,
            Command::Run {
                max_cycles: Some(3),
                no_wait: true
            }
        ));
        assert_eq!(cli.root, PathBuf::from("/tmp/project"));
    }

    #[test]
    fn parse_run_defaults() {
        let cli = Cli::parse_from(["taskloop", "run"]);
        assert!(matches!(
            cli.command,
            Command::Run {
                max_cycles: None,
                no_wait: false
            }
        ));
    }
}
