pub mod billing;
pub mod claims;
pub mod doctor;
pub mod init;
pub mod recalls;
pub mod report;
pub mod scheduler;
pub mod status;

use chrono::Utc;
use serde_json::Value;

use crate::adapters::JsonTaskLog;
use crate::domain::{AppError, TaskLogEntry, TaskStatus};

/// Run a workflow with task-log bookkeeping: a `success` entry carrying the
/// summary as `details`, or a `failed` entry carrying the error message.
///
/// The original error always wins over a log-write failure.
pub fn run_logged<F>(task_log: &JsonTaskLog, task: &str, action: F) -> Result<Value, AppError>
where
    F: FnOnce() -> Result<Value, AppError>,
{
    let started_at = Utc::now();
    match action() {
        Ok(summary) => {
            task_log.append(
                &TaskLogEntry::new(task, TaskStatus::Success, started_at)
                    .with_details(summary.clone()),
            )?;
            Ok(summary)
        }
        Err(error) => {
            let entry = TaskLogEntry::new(task, TaskStatus::Failed, started_at)
                .with_message(error.to_string());
            if let Err(log_error) = task_log.append(&entry) {
                eprintln!("Failed to record task failure: {log_error}");
            }
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn success_records_details() {
        let dir = TempDir::new().unwrap();
        let log = JsonTaskLog::new(dir.path().join("task_log.json"));

        let summary =
            run_logged(&log, "daily_recalls", || Ok(json!({"scheduled_count": 2}))).unwrap();
        assert_eq!(summary["scheduled_count"], 2);

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, TaskStatus::Success);
        assert_eq!(entries[0].details.as_ref().unwrap()["scheduled_count"], 2);
    }

    #[test]
    fn failure_records_message_and_propagates() {
        let dir = TempDir::new().unwrap();
        let log = JsonTaskLog::new(dir.path().join("task_log.json"));

        let err = run_logged(&log, "daily_claims", || {
            Err(AppError::config_error("seed data unreadable"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("seed data unreadable"));

        let entries = log.entries().unwrap();
        assert_eq!(entries[0].status, TaskStatus::Failed);
        assert_eq!(entries[0].message.as_deref(), Some("seed data unreadable"));
    }
}
