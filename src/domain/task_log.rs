//! Task log entries recording orchestration runs.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::AppError;

/// Outcome recorded for one orchestration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Started,
    Success,
    Failed,
    Stopped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Started => "started",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::Stopped => "stopped",
        }
    }
}

/// One entry of the persisted task log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLogEntry {
    pub task: String,
    pub status: TaskStatus,
    pub started_at: String,
    pub completed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl TaskLogEntry {
    pub fn new(task: &str, status: TaskStatus, started_at: DateTime<Utc>) -> Self {
        let completed_at = Utc::now();
        TaskLogEntry {
            task: task.to_string(),
            status,
            started_at: format_timestamp(started_at),
            completed_at: format_timestamp(completed_at),
            message: None,
            details: None,
        }
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// UTC timestamp in RFC 3339 with a `Z` suffix.
pub fn format_timestamp(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse the on-disk task log, which must be a JSON array of entries.
///
/// An empty or whitespace-only file reads as no history.
pub fn parse_history(raw: &str) -> Result<Vec<TaskLogEntry>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| AppError::TaskLogCorrupted(e.to_string()))?;
    if !value.is_array() {
        return Err(AppError::TaskLogCorrupted(
            "Task log must contain a JSON list of entries".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| AppError::TaskLogCorrupted(e.to_string()))
}
