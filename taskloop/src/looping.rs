//! Continuous mode: cycles separated by a pacing delay.

use anyhow::Result;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::core::scheduler::Selection;
use crate::cycle::{CycleReport, CycleRunner, CycleSummary};
use crate::io::commit::Committer;
use crate::io::executor::Executor;
use crate::pacing::Pacing;

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// Every task is completed.
    Drained,
    /// Tasks remain but none can ever become eligible.
    Blocked { remaining: Vec<String> },
    /// Cancellation was requested between cycles.
    Cancelled,
    /// This invocation ran its configured number of cycles.
    MaxCyclesReached { max_cycles: u64 },
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub cycles_run: u64,
    pub stop: LoopStop,
}

#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    /// Stop after this many cycles in this invocation.
    pub max_cycles: Option<u64>,
}

/// Run cycles until drained, blocked, cancelled, or the cycle limit is hit.
///
/// Cancellation is only observed between cycles: a cycle that has started is
/// always finished and persisted. No delay is taken when nothing is left to
/// select, and a cycle that drains the catalog reports `Drained` even if
/// cancellation arrived while it ran. Configuration and persistence errors stop the loop immediately.
pub fn run_loop<E, C, P, F>(
    runner: &mut CycleRunner<E, C>,
    pacing: &mut P,
    cancel: &CancelToken,
    options: &LoopOptions,
    mut on_cycle: F,
) -> Result<LoopOutcome>
where
    E: Executor,
    C: Committer,
    P: Pacing,
    F: FnMut(&CycleSummary),
{
    info!(max_cycles = ?options.max_cycles, "starting continuous mode");
    let mut cycles_run = 0u64;
    let stop = |stop: LoopStop, cycles_run: u64| -> Result<LoopOutcome> {
        info!(cycles_run, stop = ?stop, "loop stopped");
        Ok(LoopOutcome { cycles_run, stop })
    };

    loop {
        if cancel.is_cancelled() {
            return stop(LoopStop::Cancelled, cycles_run);
        }
        if let Some(max_cycles) = options.max_cycles
            && cycles_run >= max_cycles
        {
            return stop(LoopStop::MaxCyclesReached { max_cycles }, cycles_run);
        }

        match runner.run_cycle()? {
            CycleReport::Drained => return stop(LoopStop::Drained, cycles_run),
            CycleReport::Blocked { remaining } => {
                return stop(LoopStop::Blocked { remaining }, cycles_run);
            }
            CycleReport::Ran(summary) => {
                cycles_run += 1;
                on_cycle(&summary);
            }
        }

        // A drained or blocked catalog wins over a pending cancel or the cap.
        match runner.peek() {
            Selection::Complete => return stop(LoopStop::Drained, cycles_run),
            Selection::Blocked { remaining } => {
                return stop(LoopStop::Blocked { remaining }, cycles_run);
            }
            Selection::Next(_) => {}
        }
        if let Some(max_cycles) = options.max_cycles
            && cycles_run >= max_cycles
        {
            return stop(LoopStop::MaxCyclesReached { max_cycles }, cycles_run);
        }

        let delay = pacing.next_delay();
        info!(delay_secs = delay.as_secs(), "waiting before next cycle");
        if cancel.wait(delay) {
            debug!("cancelled during pacing delay");
            return stop(LoopStop::Cancelled, cycles_run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::ProgressState;
    use crate::core::types::{ExecOutcome, Priority, WorkerId};
    use crate::io::config::LoopConfig;
    use crate::pacing::FixedPacing;
    use crate::test_support::{RecordingCommitter, ScriptStep, ScriptedExecutor, task};
    use crate::workspace::Workspace;
    use std::time::Duration;

    fn runner(
        root: &std::path::Path,
        steps: Vec<ScriptStep>,
    ) -> CycleRunner<ScriptedExecutor, RecordingCommitter> {
        let ws = Workspace::from_parts(
            root,
            LoopConfig::default(),
            vec![
                task("a", Priority::High, &[]),
                task("b", Priority::High, &["a"]),
                task("c", Priority::Low, &[]),
            ],
            ProgressState::default(),
        );
        CycleRunner::new(ws, ScriptedExecutor::new(steps), RecordingCommitter::default())
    }

    #[test]
    fn loop_drains_without_waiting_after_last_task() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(temp.path(), Vec::new());
        let mut delays = 0;
        let mut pacing = || {
            delays += 1;
            Duration::ZERO
        };
        let mut seen = Vec::new();

        let outcome = run_loop(
            &mut runner,
            &mut pacing,
            &CancelToken::new(),
            &LoopOptions::default(),
            |s| seen.push((s.task_id.clone(), s.worker)),
        )
        .expect("loop");

        assert_eq!(outcome.stop, LoopStop::Drained);
        assert_eq!(outcome.cycles_run, 3);
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), WorkerId::Gemini),
                ("b".to_string(), WorkerId::Codex),
                ("c".to_string(), WorkerId::Claude),
            ]
        );
        assert_eq!(delays, 2);
    }

    #[test]
    fn loop_stops_at_max_cycles() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(
            temp.path(),
            vec![ScriptStep::Fail("x".into()), ScriptStep::Fail("y".into())],
        );
        let outcome = run_loop(
            &mut runner,
            &mut FixedPacing(Duration::ZERO),
            &CancelToken::new(),
            &LoopOptions {
                max_cycles: Some(2),
            },
            |s| assert_eq!(s.outcome, ExecOutcome::Failed),
        )
        .expect("loop");

        assert_eq!(outcome.stop, LoopStop::MaxCyclesReached { max_cycles: 2 });
        assert_eq!(runner.workspace().progress.cycle_count, 2);
        assert!(runner.workspace().progress.completed_tasks.is_empty());
    }

    #[test]
    fn cancel_before_start_runs_no_cycle() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(temp.path(), Vec::new());
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = run_loop(
            &mut runner,
            &mut FixedPacing(Duration::ZERO),
            &cancel,
            &LoopOptions::default(),
            |_| {},
        )
        .expect("loop");
        assert_eq!(outcome.stop, LoopStop::Cancelled);
        assert_eq!(outcome.cycles_run, 0);
    }

    #[test]
    fn cancel_during_final_cycle_still_reports_drained() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(temp.path(), Vec::new());
        let cancel = CancelToken::new();
        let trigger = cancel.clone();

        let outcome = run_loop(
            &mut runner,
            &mut FixedPacing(Duration::ZERO),
            &cancel,
            &LoopOptions::default(),
            |s| {
                if s.task_id == "c" {
                    trigger.cancel();
                }
            },
        )
        .expect("loop");
        assert_eq!(outcome.stop, LoopStop::Drained);
        assert_eq!(outcome.cycles_run, 3);
    }

    #[test]
    fn cancel_mid_catalog_stops_as_cancelled() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(temp.path(), Vec::new());
        let cancel = CancelToken::new();
        let trigger = cancel.clone();

        let outcome = run_loop(
            &mut runner,
            &mut FixedPacing(Duration::ZERO),
            &cancel,
            &LoopOptions::default(),
            |_| trigger.cancel(),
        )
        .expect("loop");
        assert_eq!(outcome.stop, LoopStop::Cancelled);
        assert_eq!(outcome.cycles_run, 1);
    }

    #[test]
    fn cancel_during_pacing_stops_before_next_selection() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut runner = runner(temp.path(), Vec::new());
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        // The "delay provider" requests shutdown, as a signal handler would mid-wait.
        let mut pacing = move || {
            trigger.cancel();
            Duration::from_secs(3600)
        };

        let outcome = run_loop(
            &mut runner,
            &mut pacing,
            &cancel,
            &LoopOptions::default(),
            |_| {},
        )
        .expect("loop");
        assert_eq!(outcome.stop, LoopStop::Cancelled);
        assert_eq!(outcome.cycles_run, 1);
        assert_eq!(runner.workspace().progress.cycle_count, 1);
    }
}
