//! Appointment records used for recall decisions.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::AppError;

/// An appointment entry from the seed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub appointment_date: NaiveDate,
    #[serde(default)]
    pub needs_recall: bool,
}

impl AppointmentRecord {
    /// A record is due for recall outreach when it is flagged explicitly or
    /// its appointment date has passed (the boundary date itself counts).
    pub fn is_due_for_recall(&self, as_of: NaiveDate) -> bool {
        self.needs_recall || self.appointment_date <= as_of
    }

    /// Parse a loosely-typed seed entry.
    ///
    /// Identifiers may arrive as numbers and are stringified; `patient_name`
    /// defaults to empty and `needs_recall` to false.
    pub fn from_value(entry: &Value) -> Result<Self, AppError> {
        let Value::Object(map) = entry else {
            return Err(AppError::config_error("Each appointment entry must be a JSON object"));
        };

        let patient_id = map
            .get("patient_id")
            .and_then(stringify)
            .ok_or_else(|| AppError::config_error("Missing required appointment field patient_id"))?;
        let patient_name = map.get("patient_name").and_then(stringify).unwrap_or_default();
        let needs_recall = map.get("needs_recall").map(truthy).unwrap_or(false);
        let appointment_date = match map.get("appointment_date") {
            Some(Value::String(raw)) => coerce_date(raw)?,
            Some(other) => return Err(AppError::InvalidDate(other.to_string())),
            None => return Err(AppError::config_error("Missing required appointment field appointment_date")),
        };

        Ok(AppointmentRecord { patient_id, patient_name, appointment_date, needs_recall })
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Boolean coercion for flag fields that arrive as bools, numbers, or strings.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "t" | "yes" | "y")
        }
        _ => false,
    }
}

/// Accepts an ISO date, an ISO datetime, or an RFC 3339 timestamp.
pub fn coerce_date(raw: &str) -> Result<NaiveDate, AppError> {
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date);
    }
    if let Ok(datetime) = raw.parse::<NaiveDateTime>() {
        return Ok(datetime.date());
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.date_naive());
    }
    Err(AppError::InvalidDate(raw.to_string()))
}
