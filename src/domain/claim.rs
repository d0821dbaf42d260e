//! Claim entries and submission results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Amount, AppError};

/// A claim queued for submission, loaded from `claims.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClaim {
    pub claim_id: String,
    pub patient_id: String,
    pub amount: Amount,
}

impl PendingClaim {
    /// Parse and validate a seed entry.
    pub fn from_value(entry: &Value) -> Result<Self, AppError> {
        let Value::Object(map) = entry else {
            return Err(AppError::InvalidClaim("Each claim entry must be a JSON object".into()));
        };

        let claim_id = required_identifier(map.get("claim_id"), "claim_id")?;
        let patient_id = required_identifier(map.get("patient_id"), "patient_id")?;
        let amount = map
            .get("amount")
            .ok_or_else(|| AppError::InvalidClaim(format!("claim '{claim_id}' is missing amount")))
            .and_then(Amount::from_json)?;
        if !amount.is_positive() {
            return Err(AppError::InvalidClaim(format!(
                "claim '{claim_id}' must have a positive amount, got {amount}"
            )));
        }

        Ok(PendingClaim { claim_id, patient_id, amount })
    }
}

fn required_identifier(value: Option<&Value>, field: &str) -> Result<String, AppError> {
    let raw = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if raw.is_empty() {
        return Err(AppError::InvalidClaim(format!("{field} must be a non-empty string")));
    }
    Ok(raw)
}

/// Final status of a submitted claim, recorded in the claim report.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimSubmissionResult {
    pub claim_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_code: Option<String>,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl ClaimSubmissionResult {
    pub fn is_rejected(&self) -> bool {
        is_rejected_status(&self.status)
    }
}

/// Statuses Halo reports for claims that did not go through.
pub fn is_rejected_status(status: &str) -> bool {
    matches!(status.to_ascii_lowercase().as_str(), "rejected" | "denied" | "error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_claim() {
        let claim = PendingClaim::from_value(&json!({
            "claim_id": "c-300",
            "patient_id": "p-100",
            "amount": 150.75,
        }))
        .unwrap();
        assert_eq!(claim.claim_id, "c-300");
        assert_eq!(claim.patient_id, "p-100");
        assert_eq!(claim.amount.cents(), 15075);
    }

    #[test]
    fn rejects_blank_identifiers() {
        let err = PendingClaim::from_value(&json!({
            "claim_id": "  ",
            "patient_id": "p-100",
            "amount": 10,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("claim_id"));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [json!(0), json!(-12.50)] {
            let err = PendingClaim::from_value(&json!({
                "claim_id": "c-1",
                "patient_id": "p-1",
                "amount": amount,
            }))
            .unwrap_err();
            assert!(err.to_string().contains("positive amount"));
        }
    }

    #[test]
    fn rejects_non_object_entries() {
        assert!(PendingClaim::from_value(&json!("c-1")).is_err());
    }

    #[test]
    fn rejected_status_classification() {
        assert!(is_rejected_status("rejected"));
        assert!(is_rejected_status("Denied"));
        assert!(is_rejected_status("ERROR"));
        assert!(!is_rejected_status("accepted"));
        assert!(!is_rejected_status("unknown"));
    }
}
