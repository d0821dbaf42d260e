//! Compliance metrics computed from loosely-typed operational datasets.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::domain::appointment::truthy;

/// Computed compliance metrics for the weekly report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub recall_completion_rate: f64,
    pub claim_rejection_rate: f64,
    pub average_wait_time_minutes: f64,
    pub total_recalls: usize,
    pub completed_recalls: usize,
    pub total_claims: usize,
    pub rejected_claims: usize,
    pub total_appointments: usize,
    pub appointments_with_wait_time: usize,
}

/// Aggregate all three datasets into a summary. Empty datasets yield 0.0
/// rates rather than an error.
pub fn summarize(recalls: &[Value], claims: &[Value], appointments: &[Value]) -> MetricSummary {
    let (recall_completion_rate, total_recalls, completed_recalls) =
        recall_completion_rate(recalls);
    let (claim_rejection_rate, total_claims, rejected_claims) = claim_rejection_rate(claims);
    let (average_wait_time_minutes, total_appointments, appointments_with_wait_time) =
        average_wait_time(appointments);

    MetricSummary {
        recall_completion_rate,
        claim_rejection_rate,
        average_wait_time_minutes,
        total_recalls,
        completed_recalls,
        total_claims,
        rejected_claims,
        total_appointments,
        appointments_with_wait_time,
    }
}

/// Percentage of recalls that reached a completed state: `(rate, total, completed)`.
pub fn recall_completion_rate(recalls: &[Value]) -> (f64, usize, usize) {
    let total = recalls.len();
    let completed = recalls.iter().filter(|r| is_recall_completed(r)).count();
    (percentage(completed, total), total, completed)
}

fn is_recall_completed(recall: &Value) -> bool {
    let status = status_of(recall);
    if matches!(status.as_str(), "completed" | "complete" | "done" | "closed" | "fulfilled") {
        return true;
    }
    if matches!(status.as_str(), "scheduled" | "pending" | "in-progress" | "open") {
        return false;
    }
    if let Some(flag) = recall.get("completed") {
        if flag.is_boolean() {
            return truthy(flag);
        }
    }
    has_value(recall, "completed_at") || has_value(recall, "completion_date")
}

/// Percentage of claims that were rejected: `(rate, total, rejected)`.
pub fn claim_rejection_rate(claims: &[Value]) -> (f64, usize, usize) {
    let total = claims.len();
    let rejected = claims.iter().filter(|c| is_claim_rejected(c)).count();
    (percentage(rejected, total), total, rejected)
}

fn is_claim_rejected(claim: &Value) -> bool {
    let status = status_of(claim);
    if matches!(status.as_str(), "rejected" | "denied" | "declined") {
        return true;
    }
    if matches!(status.as_str(), "accepted" | "approved" | "paid" | "submitted" | "processing") {
        return false;
    }
    if let Some(flag) = claim.get("rejected") {
        if flag.is_boolean() {
            return truthy(flag);
        }
    }
    has_value(claim, "rejection_reason")
}

/// Average patient wait in minutes: `(average, total, counted)`. Records
/// without usable timing data are excluded from the average.
pub fn average_wait_time(appointments: &[Value]) -> (f64, usize, usize) {
    let total = appointments.len();
    let mut counted = 0usize;
    let mut sum = 0.0f64;
    for appointment in appointments {
        if let Some(minutes) = wait_time_minutes(appointment) {
            counted += 1;
            sum += minutes;
        }
    }
    if counted == 0 {
        return (0.0, total, counted);
    }
    (sum / counted as f64, total, counted)
}

fn wait_time_minutes(appointment: &Value) -> Option<f64> {
    match appointment.get("wait_time_minutes") {
        Some(Value::Number(n)) => return n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().parse().ok(),
        _ => {}
    }

    let check_in = field_string(appointment, &["check_in_time", "check_in"])?;
    let start = field_string(
        appointment,
        &["appointment_start_time", "start_time", "started_at"],
    )?;
    let check_in = parse_datetime(&check_in)?;
    let start = parse_datetime(&start)?;
    if start < check_in {
        return None;
    }
    Some((start - check_in).num_seconds() as f64 / 60.0)
}

/// Lenient timestamp parsing for feed data that mixes formats.
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    let cleaned = cleaned.replace('Z', "+00:00");
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for format in FORMATS {
        if format.contains("%z") {
            if let Ok(parsed) = chrono::DateTime::parse_from_str(&cleaned, format) {
                return Some(parsed.naive_utc());
            }
        } else if let Ok(parsed) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(parsed);
        }
    }
    None
}

/// Whether a record carries a non-empty value for every required field.
pub fn has_required_fields(record: &Value, required: &[&str]) -> bool {
    required.iter().all(|field| has_value(record, field))
}

fn has_value(record: &Value, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn field_string(record: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn status_of(record: &Value) -> String {
    record
        .get("status")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64) * 100.0
}
