//! Task execution log backed by a JSON array file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::adapters::JsonHistory;
use crate::domain::{AppError, TaskLogEntry};

/// Shared task log. Appends are serialized behind a mutex so the scheduler
/// thread and command handlers never interleave writes.
#[derive(Debug)]
pub struct JsonTaskLog {
    history: JsonHistory,
    write_lock: Mutex<()>,
}

impl JsonTaskLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonTaskLog {
            history: JsonHistory::new(path),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.history.path()
    }

    pub fn append(&self, entry: &TaskLogEntry) -> Result<(), AppError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::TaskLogCorrupted("task log lock poisoned".to_string()))?;
        let record = serde_json::to_value(entry)?;
        self.history.append(vec![record])
    }

    pub fn entries(&self) -> Result<Vec<TaskLogEntry>, AppError> {
        let raw = self.history.read()?;
        serde_json::from_value(Value::Array(raw))
            .map_err(|e| AppError::TaskLogCorrupted(e.to_string()))
    }

    /// The most recent `limit` entries, oldest first.
    pub fn tail(&self, limit: usize) -> Result<Vec<TaskLogEntry>, AppError> {
        let mut entries = self.entries()?;
        if entries.len() > limit {
            entries.drain(..entries.len() - limit);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use tempfile::TempDir;

    #[test]
    fn appended_entries_round_trip() {
        let dir = TempDir::new().unwrap();
        let log = JsonTaskLog::new(dir.path().join("task_log.json"));

        let started = chrono::Utc::now();
        log.append(&TaskLogEntry::new("process_recalls", TaskStatus::Started, started)).unwrap();
        log.append(
            &TaskLogEntry::new("process_recalls", TaskStatus::Success, started)
                .with_message("2 recalls sent"),
        )
        .unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, TaskStatus::Started);
        assert_eq!(entries[1].message.as_deref(), Some("2 recalls sent"));
    }

    #[test]
    fn tail_keeps_only_the_newest_entries() {
        let dir = TempDir::new().unwrap();
        let log = JsonTaskLog::new(dir.path().join("task_log.json"));
        let now = chrono::Utc::now();
        for i in 0..5 {
            log.append(&TaskLogEntry::new(&format!("task_{i}"), TaskStatus::Success, now)).unwrap();
        }
        let tail = log.tail(2).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].task, "task_3");
        assert_eq!(tail[1].task, "task_4");
    }

    #[test]
    fn corrupted_log_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("task_log.json");
        std::fs::write(&path, "[{\"task\": 12}]").unwrap();
        let log = JsonTaskLog::new(&path);
        assert!(matches!(log.entries(), Err(AppError::TaskLogCorrupted(_))));
    }
}
