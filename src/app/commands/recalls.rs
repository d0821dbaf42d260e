use chrono::NaiveDate;
use serde_json::Value;

use crate::app::AppContext;
use crate::domain::{AppError, RecallNotice, RecallReport};
use crate::ports::{ReminderSender, SeedStore};

pub const RECALL_REPORT_FILE: &str = "recall_report.json";

/// Execute the recall workflow for a reference date.
///
/// Dispatches a reminder for every due appointment and persists the report;
/// individual send failures are recorded per notice, never aborting the run.
pub fn execute<S: SeedStore>(
    ctx: &AppContext<S>,
    sender: &dyn ReminderSender,
    as_of: NaiveDate,
) -> Result<Value, AppError> {
    let appointments = ctx.seeds().load_appointments()?;
    let due: Vec<_> =
        appointments.into_iter().filter(|record| record.is_due_for_recall(as_of)).collect();

    let mut notifications = Vec::with_capacity(due.len());
    for record in &due {
        let notice = match sender.send(record, as_of) {
            Ok(()) => RecallNotice {
                patient_id: record.patient_id.clone(),
                patient_name: record.patient_name.clone(),
                scheduled_for: as_of,
                success: true,
                message: "reminder dispatched".to_string(),
            },
            Err(error) => RecallNotice {
                patient_id: record.patient_id.clone(),
                patient_name: record.patient_name.clone(),
                scheduled_for: as_of,
                success: false,
                message: error.to_string(),
            },
        };
        notifications.push(notice);
    }

    let report = RecallReport::new(as_of, notifications);
    write_report(ctx, &report)?;
    Ok(report.summary())
}

fn write_report<S: SeedStore>(ctx: &AppContext<S>, report: &RecallReport) -> Result<(), AppError> {
    let reports_dir = &ctx.config().reports_dir;
    std::fs::create_dir_all(reports_dir)?;
    let serialized = serde_json::to_string_pretty(report)?;
    std::fs::write(reports_dir.join(RECALL_REPORT_FILE), format!("{serialized}\n"))?;
    Ok(())
}
