//! Scaffolding for `.taskloop/`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::catalog::default_catalog;
use crate::core::progress::ProgressState;
use crate::io::catalog_store::write_catalog;
use crate::io::config::{LoopConfig, write_config};
use crate::io::paths::LoopPaths;
use crate::io::progress_store::write_progress;

/// Options for [`init_loop`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing loop-owned files.
    pub force: bool,
}

/// Create `.taskloop/` in `root` with the default catalog, a fresh progress
/// record, and the default config.
///
/// Fails if `.taskloop/` already exists unless `options.force` is set.
pub fn init_loop(root: &Path, options: &InitOptions) -> Result<LoopPaths> {
    let paths = LoopPaths::new(root);
    if paths.loop_dir.exists() && !paths.loop_dir.is_dir() {
        return Err(anyhow!("init: .taskloop exists but is not a directory"));
    }
    if paths.loop_dir.exists() && !options.force {
        return Err(anyhow!(
            "init: .taskloop already exists (use --force to overwrite)"
        ));
    }

    fs::create_dir_all(&paths.cycles_dir)
        .with_context(|| format!("create directory {}", paths.cycles_dir.display()))?;
    let config = LoopConfig::default();
    write_config(&paths.config_path, &config)?;
    write_catalog(&paths.catalog_path, &default_catalog())?;
    write_progress(&paths.progress_path, &ProgressState::new(&config.phase))?;

    info!(root = %root.display(), "initialized .taskloop");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::catalog_store::load_catalog;
    use crate::io::config::load_config;
    use crate::io::progress_store::load_progress;

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_loop(temp.path(), &InitOptions { force: false }).expect("init");

        assert!(paths.cycles_dir.is_dir());
        assert_eq!(load_catalog(&paths.catalog_path).expect("catalog"), default_catalog());
        assert_eq!(load_config(&paths.config_path).expect("config"), LoopConfig::default());
        assert_eq!(
            load_progress(&paths.progress_path).expect("progress"),
            ProgressState::default()
        );
    }

    #[test]
    fn init_without_force_refuses_existing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_loop(temp.path(), &InitOptions { force: false }).expect("init");
        let err = init_loop(temp.path(), &InitOptions { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_force_resets_progress() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_loop(temp.path(), &InitOptions { force: false }).expect("init");
        let mut progress = ProgressState::default();
        progress.cycle_count = 9;
        write_progress(&paths.progress_path, &progress).expect("write");

        init_loop(temp.path(), &InitOptions { force: true }).expect("re-init");
        assert_eq!(
            load_progress(&paths.progress_path)
                .expect("progress")
                .cycle_count,
            0
        );
    }
}
