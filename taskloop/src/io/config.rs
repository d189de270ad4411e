//! Loop configuration stored under `.taskloop/config.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::types::WorkerId;
use crate::errors::ConfigurationError;
use crate::io::atomic::write_atomic;

/// Loop configuration (TOML).
///
/// Meant to be edited by humans. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoopConfig {
    /// Rotation roster, in rotation order.
    pub workers: Vec<WorkerId>,

    /// `currentPhase` for a fresh progress record.
    pub phase: String,

    pub pacing: PacingConfig,
    pub executor: ExecutorConfig,
    pub commit: CommitConfig,
}

/// Inclusive window for the randomized delay between cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    pub min_secs: u64,
    pub max_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Write stub files for missing targets.
    Placeholder,
    /// Spawn `command` with the task brief on stdin.
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,

    /// Argv for `kind = "command"`; `{worker}` and `{task}` are substituted.
    pub command: Vec<String>,

    /// Wall-clock budget for one executor invocation.
    pub timeout_secs: u64,

    /// Truncate executor stdout/stderr logs beyond this many bytes.
    pub output_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommitConfig {
    pub enabled: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            workers: WorkerId::ALL.to_vec(),
            phase: "implementation".to_string(),
            pacing: PacingConfig::default(),
            executor: ExecutorConfig::default(),
            commit: CommitConfig::default(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 30 * 60,
            max_secs: 35 * 60,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::Placeholder,
            command: Vec::new(),
            timeout_secs: 30 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PacingConfig {
    pub fn window(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.min_secs),
            Duration::from_secs(self.max_secs),
        )
    }
}

impl LoopConfig {
    /// All problems with this config; empty when valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.workers.is_empty() {
            problems.push("workers must list at least one worker".to_string());
        }
        let mut seen = HashSet::new();
        for worker in &self.workers {
            if !seen.insert(*worker) {
                problems.push(format!("workers lists '{worker}' more than once"));
            }
        }
        if self.pacing.min_secs > self.pacing.max_secs {
            problems.push(format!(
                "pacing.min_secs ({}) must be <= pacing.max_secs ({})",
                self.pacing.min_secs, self.pacing.max_secs
            ));
        }
        if self.executor.timeout_secs == 0 {
            problems.push("executor.timeout_secs must be > 0".to_string());
        }
        if self.executor.output_limit_bytes == 0 {
            problems.push("executor.output_limit_bytes must be > 0".to_string());
        }
        if self.executor.kind == ExecutorKind::Command
            && self
                .executor
                .command
                .first()
                .is_none_or(|program| program.trim().is_empty())
        {
            problems.push("executor.command must be a non-empty array".to_string());
        }
        problems
    }

    pub fn validate(&self, path: &Path) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }
        Err(ConfigurationError::new(path, problems).into())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LoopConfig::default()`.
pub fn load_config(path: &Path) -> Result<LoopConfig> {
    if !path.exists() {
        return Ok(LoopConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LoopConfig = toml::from_str(&contents)
        .map_err(|err| ConfigurationError::single(path, format!("invalid toml: {err}")))?;
    cfg.validate(path)?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &LoopConfig) -> Result<()> {
    cfg.validate(path)?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
