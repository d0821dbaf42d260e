//! Recall outreach results.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};

/// Outcome of one reminder dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallNotice {
    pub patient_id: String,
    pub patient_name: String,
    pub scheduled_for: NaiveDate,
    pub success: bool,
    pub message: String,
}

/// Aggregate result of a recall run, persisted as `recall_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RecallReport {
    pub generated_at: String,
    pub as_of: NaiveDate,
    pub total_due: usize,
    pub total_notified: usize,
    pub total_failures: usize,
    pub notifications: Vec<RecallNotice>,
}

impl RecallReport {
    pub fn new(as_of: NaiveDate, notifications: Vec<RecallNotice>) -> Self {
        let total_notified = notifications.iter().filter(|n| n.success).count();
        let total_failures = notifications.len() - total_notified;
        RecallReport {
            generated_at: crate::domain::task_log::format_timestamp(chrono::Utc::now()),
            as_of,
            total_due: notifications.len(),
            total_notified,
            total_failures,
            notifications,
        }
    }

    /// Summary recorded in the task log after a recall run.
    pub fn summary(&self) -> Value {
        let recalls: Vec<Value> = self
            .notifications
            .iter()
            .map(|notice| {
                json!({
                    "patient_id": notice.patient_id,
                    "patient_name": notice.patient_name,
                    "scheduled_for": notice.scheduled_for,
                })
            })
            .collect();
        json!({
            "as_of": self.as_of,
            "scheduled_count": recalls.len(),
            "recalls": recalls,
        })
    }
}
