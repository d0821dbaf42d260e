use std::path::{Path, PathBuf};

use crate::adapters::{FilesystemSeedStore, JsonTaskLog};
use crate::domain::{AppError, OrchestratorConfig};
use crate::ports::SeedStore;

/// Application context holding configuration and dependencies for command
/// execution.
pub struct AppContext<S: SeedStore> {
    root: PathBuf,
    config: OrchestratorConfig,
    seeds: S,
    task_log: JsonTaskLog,
}

impl AppContext<FilesystemSeedStore> {
    /// Load the context for a workspace root, resolving `zantra.toml` and
    /// environment overrides.
    pub fn load(root: &Path) -> Result<Self, AppError> {
        let config = OrchestratorConfig::load(root)?;
        let seeds = FilesystemSeedStore::new(&config.data_dir);
        let task_log = JsonTaskLog::new(&config.task_log_path);
        Ok(Self { root: root.to_path_buf(), config, seeds, task_log })
    }
}

impl<S: SeedStore> AppContext<S> {
    pub fn new(root: &Path, config: OrchestratorConfig, seeds: S) -> Self {
        let task_log = JsonTaskLog::new(&config.task_log_path);
        Self { root: root.to_path_buf(), config, seeds, task_log }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn seeds(&self) -> &S {
        &self.seeds
    }

    pub fn task_log(&self) -> &JsonTaskLog {
        &self.task_log
    }
}
