//! Seed data store port.

use serde_json::Value;

use crate::domain::{AppError, AppointmentRecord, BillingCodeTable, PendingClaim};

/// Port for reading optional seed and operational datasets.
///
/// Every loader treats a missing source as empty data rather than an error;
/// deployments may supply any subset of the seed files.
pub trait SeedStore {
    /// Appointment records from `appointments.json`.
    fn load_appointments(&self) -> Result<Vec<AppointmentRecord>, AppError>;

    /// Claims queued for submission from `claims.json`.
    fn load_pending_claims(&self) -> Result<Vec<PendingClaim>, AppError>;

    /// Billing code table from `billing_codes.json`.
    fn load_billing_codes(&self) -> Result<BillingCodeTable, AppError>;

    /// A loosely-typed compliance dataset (`<name>.json`), keeping only
    /// records that carry all `required` fields.
    fn load_dataset(&self, name: &str, required: &[&str]) -> Result<Vec<Value>, AppError>;
}
