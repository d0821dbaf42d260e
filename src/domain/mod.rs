//! Pure domain types and logic for the orchestrator.

pub mod amount;
pub mod appointment;
pub mod billing_code;
pub mod claim;
pub mod config;
pub mod error;
pub mod fhir;
pub mod metrics;
pub mod recall;
pub mod schedule;
pub mod task_log;

pub use amount::Amount;
pub use appointment::AppointmentRecord;
pub use billing_code::{BillingCode, BillingCodeTable};
pub use claim::{ClaimSubmissionResult, PendingClaim};
pub use config::{HaloConfig, HaloCredentials, OrchestratorConfig, ScheduleConfig};
pub use error::AppError;
pub use metrics::MetricSummary;
pub use recall::{RecallNotice, RecallReport};
pub use schedule::DailyTask;
pub use task_log::{TaskLogEntry, TaskStatus};
