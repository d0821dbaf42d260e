//! Shared testing utilities for zantra CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Testing harness providing an isolated workspace for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated workspace.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Path to the workspace directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for invoking the compiled `zantra` binary within the
    /// workspace. Halo credentials are cleared so tests never hit a network.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("zantra").expect("Failed to locate zantra binary");
        cmd.current_dir(&self.work_dir)
            .env_remove("HALO_CLIENT_ID")
            .env_remove("HALO_CLIENT_SECRET")
            .env_remove("DATA_DIR");
        cmd
    }

    /// Run `zantra init` and assert it succeeded.
    pub fn init(&self) {
        self.cli().arg("init").assert().success();
    }

    /// Overwrite a seed file under `data/`.
    pub fn write_seed(&self, file_name: &str, content: &str) {
        let data_dir = self.work_dir.join("data");
        fs::create_dir_all(&data_dir).expect("Failed to create data directory");
        fs::write(data_dir.join(file_name), content).expect("Failed to write seed file");
    }

    /// Read a file relative to the workspace.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.work_dir.join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    /// Whether a workspace-relative path exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.work_dir.join(relative).exists()
    }
}
