//! FHIR Claim resource construction and response interpretation.

use chrono::Utc;
use serde_json::{Value, json};

use crate::domain::{Amount, AppError, BillingCode, PendingClaim};

const CPT_SYSTEM: &str = "http://www.ama-assn.org/go/cpt";
const ICD10_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-10";
const CLAIM_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/claim-type";
const PRIORITY_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/processpriority";

/// Identifier of a completed appointment payload, wherever Halo put it.
pub fn appointment_id(appointment: &Value) -> Option<String> {
    string_at(appointment, "id")
        .or_else(|| string_at(appointment, "appointmentId"))
        .or_else(|| appointment.get("resource").and_then(|r| string_at(r, "id")))
        .filter(|id| !id.is_empty())
}

/// Appointment type used to pick a billing code.
pub fn appointment_type(appointment: &Value) -> Option<String> {
    string_at(appointment, "appointmentType")
        .or_else(|| string_at(appointment, "type"))
        .or_else(|| string_at(appointment, "reason"))
        .filter(|t| !t.is_empty())
}

/// Charge amount for an appointment: explicit `chargeAmount`, else the code
/// table default, else zero.
pub fn charge_amount(appointment: &Value, code: &BillingCode) -> Result<Amount, AppError> {
    match appointment.get("chargeAmount") {
        Some(value) => Amount::from_json(value),
        None => Ok(code.charge_amount.unwrap_or(Amount::ZERO)),
    }
}

/// Build a professional FHIR `Claim` for a completed appointment.
pub fn build_claim_resource(
    appointment: &Value,
    code: &BillingCode,
    amount: Amount,
) -> Result<Value, AppError> {
    let patient_id = string_at(appointment, "patientId")
        .or_else(|| appointment.get("patient").and_then(|p| string_at(p, "id")));
    let provider_id =
        string_at(appointment, "practitionerId").or_else(|| string_at(appointment, "providerId"));
    let (Some(patient_id), Some(provider_id)) = (patient_id, provider_id) else {
        return Err(AppError::config_error(
            "Appointment must include patientId and practitionerId for claim generation",
        ));
    };

    let money = json!({ "value": amount.to_f64(), "currency": "USD" });
    let mut claim = json!({
        "resourceType": "Claim",
        "status": "active",
        "type": {
            "coding": [{ "system": CLAIM_TYPE_SYSTEM, "code": "professional" }]
        },
        "use": "claim",
        "patient": { "reference": format!("Patient/{patient_id}") },
        "created": Utc::now().to_rfc3339(),
        "provider": { "reference": format!("Practitioner/{provider_id}") },
        "priority": {
            "coding": [{ "system": PRIORITY_SYSTEM, "code": "normal" }]
        },
        "item": [{
            "sequence": 1,
            "productOrService": {
                "coding": [{
                    "system": CPT_SYSTEM,
                    "code": code.procedure_code.clone(),
                    "display": code.display.clone(),
                }]
            },
            "net": money.clone(),
            "unitPrice": money.clone(),
        }],
        "total": money,
    });

    let fields = claim.as_object_mut().expect("claim literal is an object");

    if let Some(start) = string_at(appointment, "start") {
        let end = string_at(appointment, "end").unwrap_or_else(|| start.clone());
        fields.insert("billablePeriod".into(), json!({ "start": start, "end": end }));
    }
    if let Some(encounter_id) = string_at(appointment, "encounterId") {
        fields.insert(
            "encounter".into(),
            json!([{ "reference": format!("Encounter/{encounter_id}") }]),
        );
    }
    let coverage_id = string_at(appointment, "insurancePlanId")
        .or_else(|| string_at(appointment, "coverageId"));
    if let Some(coverage_id) = coverage_id {
        fields.insert(
            "insurance".into(),
            json!([{
                "sequence": 1,
                "focal": true,
                "coverage": { "reference": format!("Coverage/{coverage_id}") },
            }]),
        );
    }

    let diagnosis: Vec<Value> = appointment
        .get("diagnosisCodes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .enumerate()
                .map(|(index, code)| {
                    json!({
                        "sequence": index + 1,
                        "diagnosisCodeableConcept": {
                            "coding": [{ "system": ICD10_SYSTEM, "code": code }]
                        },
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    if !diagnosis.is_empty() {
        fields.insert("diagnosis".into(), Value::Array(diagnosis));
    }

    Ok(claim)
}

/// Build the minimal FHIR `Claim` used for seed-file claims, which carry only
/// a claim id, a patient, and an amount.
pub fn build_seed_claim_resource(claim: &PendingClaim) -> Value {
    let money = json!({ "value": claim.amount.to_f64(), "currency": "USD" });
    json!({
        "resourceType": "Claim",
        "status": "active",
        "type": {
            "coding": [{ "system": CLAIM_TYPE_SYSTEM, "code": "professional" }]
        },
        "use": "claim",
        "identifier": [{ "value": claim.claim_id.clone() }],
        "patient": { "reference": format!("Patient/{}", claim.patient_id) },
        "created": Utc::now().to_rfc3339(),
        "priority": {
            "coding": [{ "system": PRIORITY_SYSTEM, "code": "normal" }]
        },
        "total": money,
    })
}

/// Identifier assigned by Halo in a claim submission response.
pub fn submission_id(submission: &Value) -> Option<String> {
    string_at(submission, "id")
        .or_else(|| string_at(submission, "claimId"))
        .or_else(|| string_at(submission, "identifier"))
        .filter(|id| !id.is_empty())
}

/// Extract `(status, rejection reason)` from a claim status payload.
///
/// The reason aggregates `error`/`issue` entries; when none carry details,
/// an adverse `outcome` stands in.
pub fn parse_claim_status(payload: &Value) -> (String, Option<String>) {
    if payload.is_null() || payload.as_object().is_some_and(|map| map.is_empty()) {
        return ("unknown".to_string(), None);
    }

    let status = string_at(payload, "status")
        .or_else(|| payload.get("resource").and_then(|r| string_at(r, "status")))
        .unwrap_or_else(|| "unknown".to_string());
    let outcome = string_at(payload, "outcome")
        .or_else(|| payload.get("resource").and_then(|r| string_at(r, "outcome")));

    let mut reasons: Vec<String> = Vec::new();
    let issues = payload.get("error").or_else(|| payload.get("issue"));
    let issues: Vec<&Value> = match issues {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };

    for issue in issues {
        let code = string_at(issue, "code")
            .or_else(|| issue.get("details").and_then(|d| string_at(d, "code")));
        let details = string_at(issue, "diagnostics")
            .or_else(|| issue.get("details").and_then(|d| string_at(d, "text")))
            .or_else(|| issue.get("details").and_then(Value::as_str).map(str::to_string));
        match (code, details) {
            (Some(code), Some(details)) => reasons.push(format!("{code}: {details}")),
            (Some(code), None) => reasons.push(code),
            (None, Some(details)) => reasons.push(details),
            (None, None) => {}
        }
    }

    if reasons.is_empty()
        && let Some(outcome) = outcome
        && matches!(outcome.as_str(), "error" | "rejected" | "denied")
    {
        reasons.push(outcome);
    }

    let reason = if reasons.is_empty() { None } else { Some(reasons.join("; ")) };
    (status, reason)
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_code() -> BillingCode {
        BillingCode {
            procedure_code: "99396".to_string(),
            display: Some("Preventive visit".to_string()),
            charge_amount: Some(Amount::from_cents(18000)),
        }
    }

    #[test]
    fn builds_full_claim_resource() {
        let appointment = json!({
            "id": "appt-1",
            "patientId": "p-100",
            "practitionerId": "dr-7",
            "encounterId": "enc-4",
            "insurancePlanId": "cov-2",
            "start": "2026-02-03T09:00:00Z",
            "end": "2026-02-03T09:30:00Z",
            "diagnosisCodes": ["E11.9", "I10"],
        });
        let claim =
            build_claim_resource(&appointment, &sample_code(), Amount::from_cents(18000)).unwrap();

        assert_eq!(claim["resourceType"], "Claim");
        assert_eq!(claim["patient"]["reference"], "Patient/p-100");
        assert_eq!(claim["provider"]["reference"], "Practitioner/dr-7");
        assert_eq!(claim["item"][0]["productOrService"]["coding"][0]["code"], "99396");
        assert_eq!(claim["total"]["value"], 180.0);
        assert_eq!(claim["billablePeriod"]["end"], "2026-02-03T09:30:00Z");
        assert_eq!(claim["encounter"][0]["reference"], "Encounter/enc-4");
        assert_eq!(claim["insurance"][0]["coverage"]["reference"], "Coverage/cov-2");
        assert_eq!(claim["diagnosis"][1]["sequence"], 2);
        assert_eq!(
            claim["diagnosis"][0]["diagnosisCodeableConcept"]["coding"][0]["code"],
            "E11.9"
        );
    }

    #[test]
    fn omits_optional_blocks_when_fields_absent() {
        let appointment = json!({ "patientId": "p-1", "providerId": "dr-1" });
        let claim =
            build_claim_resource(&appointment, &sample_code(), Amount::from_cents(100)).unwrap();
        assert!(claim.get("billablePeriod").is_none());
        assert!(claim.get("encounter").is_none());
        assert!(claim.get("insurance").is_none());
        assert!(claim.get("diagnosis").is_none());
    }

    #[test]
    fn requires_patient_and_provider() {
        let err = build_claim_resource(&json!({"patientId": "p-1"}), &sample_code(), Amount::ZERO)
            .unwrap_err();
        assert!(err.to_string().contains("practitionerId"));
    }

    #[test]
    fn extracts_appointment_fields_from_variants() {
        assert_eq!(appointment_id(&json!({"appointmentId": "a-2"})).unwrap(), "a-2");
        assert_eq!(appointment_id(&json!({"resource": {"id": 7}})).unwrap(), "7");
        assert!(appointment_id(&json!({"id": ""})).is_none());
        assert_eq!(appointment_type(&json!({"reason": "sick_visit"})).unwrap(), "sick_visit");
        assert!(appointment_type(&json!({})).is_none());
    }

    #[test]
    fn charge_amount_prefers_explicit_value() {
        let code = sample_code();
        assert_eq!(
            charge_amount(&json!({"chargeAmount": "95.50"}), &code).unwrap().cents(),
            9550
        );
        assert_eq!(charge_amount(&json!({}), &code).unwrap().cents(), 18000);
        let bare = BillingCode { procedure_code: "1".into(), display: None, charge_amount: None };
        assert_eq!(charge_amount(&json!({}), &bare).unwrap(), Amount::ZERO);
    }

    #[test]
    fn submission_id_checks_known_keys() {
        assert_eq!(submission_id(&json!({"claimId": "c-9"})).unwrap(), "c-9");
        assert_eq!(submission_id(&json!({"identifier": "c-10"})).unwrap(), "c-10");
        assert!(submission_id(&json!({"outcome": "ok"})).is_none());
    }

    #[test]
    fn parses_claim_status_with_issue_details() {
        let (status, reason) = parse_claim_status(&json!({
            "status": "rejected",
            "issue": [
                { "code": "invalid", "diagnostics": "coverage expired" },
                { "details": { "text": "resubmit with plan id" } },
            ],
        }));
        assert_eq!(status, "rejected");
        assert_eq!(reason.unwrap(), "invalid: coverage expired; resubmit with plan id");
    }

    #[test]
    fn falls_back_to_adverse_outcome() {
        let (status, reason) = parse_claim_status(&json!({"outcome": "denied"}));
        assert_eq!(status, "unknown");
        assert_eq!(reason.unwrap(), "denied");

        let (status, reason) = parse_claim_status(&json!({"outcome": "complete"}));
        assert_eq!(status, "unknown");
        assert!(reason.is_none());
    }

    #[test]
    fn empty_payload_is_unknown() {
        assert_eq!(parse_claim_status(&json!({})), ("unknown".to_string(), None));
        assert_eq!(parse_claim_status(&Value::Null), ("unknown".to_string(), None));
    }

    #[test]
    fn seed_claim_resource_carries_identifier_and_total() {
        let claim = PendingClaim {
            claim_id: "c-300".into(),
            patient_id: "p-9".into(),
            amount: Amount::from_cents(4550),
        };
        let resource = build_seed_claim_resource(&claim);
        assert_eq!(resource["identifier"][0]["value"], "c-300");
        assert_eq!(resource["patient"]["reference"], "Patient/p-9");
        assert_eq!(resource["total"]["value"], 45.5);
    }
}
