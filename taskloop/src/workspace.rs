//! The explicit run state handed to the cycle runner.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::progress::ProgressState;
use crate::core::types::TaskDefinition;
use crate::io::catalog_store::load_or_bootstrap_catalog;
use crate::io::config::{LoopConfig, load_config};
use crate::io::paths::LoopPaths;
use crate::io::progress_store::{load_or_default_progress, warn_unknown_completions};

/// Catalog, config, and progress for one project root.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: LoopPaths,
    pub config: LoopConfig,
    pub catalog: Vec<TaskDefinition>,
    pub progress: ProgressState,
}

impl Workspace {
    /// Load everything under `root/.taskloop`, bootstrapping the catalog if needed.
    ///
    /// Fails with a `ConfigurationError` if any record is malformed.
    pub fn load(root: &Path) -> Result<Self> {
        let paths = LoopPaths::new(root);
        let config = load_config(&paths.config_path).context("load config")?;
        let catalog = load_or_bootstrap_catalog(&paths.catalog_path).context("load catalog")?;
        let progress = load_or_default_progress(&paths.progress_path, &config.phase)
            .context("load progress")?;
        warn_unknown_completions(&progress, &catalog);
        debug!(
            tasks = catalog.len(),
            completed = progress.completed_tasks.len(),
            cycle_count = progress.cycle_count,
            "workspace loaded"
        );
        Ok(Self {
            paths,
            config,
            catalog,
            progress,
        })
    }

    /// Build a workspace from in-memory parts (nothing is read from disk).
    pub fn from_parts(
        root: &Path,
        config: LoopConfig,
        catalog: Vec<TaskDefinition>,
        progress: ProgressState,
    ) -> Self {
        Self {
            paths: LoopPaths::new(root),
            config,
            catalog,
            progress,
        }
    }
}
