//! Canonical locations inside `.taskloop/`.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LoopPaths {
    pub root: PathBuf,
    pub loop_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub progress_path: PathBuf,
    pub config_path: PathBuf,
    pub cycles_dir: PathBuf,
}

impl LoopPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let loop_dir = root.join(".taskloop");
        Self {
            root: root.clone(),
            catalog_path: loop_dir.join("tasks.json"),
            progress_path: loop_dir.join("state.json"),
            config_path: loop_dir.join("config.toml"),
            cycles_dir: loop_dir.join("cycles"),
            loop_dir,
        }
    }

    pub fn cycle_record_path(&self, cycle: u64) -> PathBuf {
        self.cycles_dir.join(format!("{cycle}.json"))
    }
}
