//! Child process execution with a deadline and bounded output capture.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// What a finished (or killed) child left behind.
#[derive(Debug)]
pub struct CapturedRun {
    pub status: ExitStatus,
    pub stdout: Captured,
    pub stderr: Captured,
    pub timed_out: bool,
}

/// A stream kept up to a byte limit; the rest is drained and counted.
#[derive(Debug, Default)]
pub struct Captured {
    pub bytes: Vec<u8>,
    pub dropped: usize,
}

impl Captured {
    pub fn text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.dropped > 0 {
            text.push_str(&format!("\n[{} bytes dropped]\n", self.dropped));
        }
        text
    }
}

impl CapturedRun {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.status.success()
    }

    /// Combined stdout/stderr report for a log file.
    pub fn render_log(&self) -> String {
        let mut log = String::new();
        log.push_str("=== stdout ===\n");
        log.push_str(&self.stdout.text());
        log.push_str("\n=== stderr ===\n");
        log.push_str(&self.stderr.text());
        if self.timed_out {
            log.push_str("\n[timed out]\n");
        }
        log
    }
}

/// Spawn `cmd`, feed `stdin`, and wait at most `timeout`, killing the child past it.
///
/// stdout/stderr are drained on their own threads so a chatty child cannot block
/// on a full pipe; at most `limit` bytes of each are kept.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), limit))]
pub fn run_with_deadline(
    mut cmd: Command,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
    limit: usize,
) -> Result<CapturedRun> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(thread::spawn(move || -> Result<()> {
            pipe.write_all(&input).context("write stdin")?;
            Ok(())
        })),
        (Some(_), None) => return Err(anyhow!("stdin was not piped")),
        _ => None,
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_reader = thread::spawn(move || drain(stdout, limit));
    let stderr_reader = thread::spawn(move || drain(stderr, limit));

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    if let Some(writer) = writer {
        // A child that exits without reading stdin breaks the pipe; that is not our error.
        if let Err(err) = join(writer) {
            debug!(err = %err, "stdin writer finished with error");
        }
    }
    let stdout = join(stdout_reader).context("join stdout")?;
    let stderr = join(stderr_reader).context("join stderr")?;
    if stdout.dropped > 0 || stderr.dropped > 0 {
        warn!(
            stdout_dropped = stdout.dropped,
            stderr_dropped = stderr.dropped,
            "output truncated"
        );
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CapturedRun {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("process io thread panicked"))?
}

fn drain<R: Read>(mut reader: R, limit: usize) -> Result<Captured> {
    let mut captured = Captured::default();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(captured.bytes.len()));
        captured.bytes.extend_from_slice(&chunk[..keep]);
        captured.dropped += n - keep;
    }
    Ok(captured)
}
