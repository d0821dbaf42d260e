//! Halo Connect client port definition.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::domain::AppError;

/// Port for Halo Connect FHIR operations used by the billing workflows.
pub trait HaloClient {
    /// Completed appointments within a UTC window.
    fn completed_appointments(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, AppError>;

    /// Submit a FHIR `Claim` resource; returns the submission response.
    fn submit_claim(&self, resource: &Value) -> Result<Value, AppError>;

    /// Fetch the current status payload for a submitted claim.
    fn claim_status(&self, claim_id: &str) -> Result<Value, AppError>;
}

/// Mock client for dry runs without network access.
///
/// Accepts every claim and reports no completed appointments, printing what
/// a real run would have sent.
#[derive(Debug, Default)]
pub struct MockHaloClient {
    submissions: AtomicU64,
}

impl HaloClient for MockHaloClient {
    fn completed_appointments(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, AppError> {
        println!("=== DRY RUN ===");
        println!("Would fetch completed appointments from {start} to {end}");
        Ok(Vec::new())
    }

    fn submit_claim(&self, resource: &Value) -> Result<Value, AppError> {
        let sequence = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let total = resource.pointer("/total/value").and_then(Value::as_f64).unwrap_or(0.0);
        println!("=== DRY RUN ===");
        println!("Would submit claim:");
        println!("  Patient: {}", resource.pointer("/patient/reference").and_then(Value::as_str).unwrap_or("<unknown>"));
        println!("  Total: {total:.2} USD");
        Ok(json!({ "id": format!("dry-run-{sequence}"), "status": "accepted" }))
    }

    fn claim_status(&self, claim_id: &str) -> Result<Value, AppError> {
        Ok(json!({ "id": claim_id, "status": "accepted" }))
    }
}
