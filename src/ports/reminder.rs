//! Reminder dispatch port.

use crate::domain::{AppError, AppointmentRecord};
use chrono::NaiveDate;

/// Port for patient reminder delivery.
pub trait ReminderSender {
    fn send(&self, record: &AppointmentRecord, scheduled_for: NaiveDate) -> Result<(), AppError>;
}

/// Default sender that records the outreach on stdout.
///
/// Production deployments wire an email/SMS integration here; the upstream
/// system ships the same stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReminderSender;

impl ReminderSender for LogReminderSender {
    fn send(&self, record: &AppointmentRecord, scheduled_for: NaiveDate) -> Result<(), AppError> {
        let display_name =
            if record.patient_name.is_empty() { &record.patient_id } else { &record.patient_name };
        println!("Sending recall reminder to {display_name} (scheduled for {scheduled_for})");
        Ok(())
    }
}
