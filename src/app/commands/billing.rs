use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::app::AppContext;
use crate::app::commands::claims;
use crate::domain::{AppError, ClaimSubmissionResult, fhir};
use crate::ports::{HaloClient, SeedStore};

/// Bill every appointment completed on `date`.
///
/// Appointments without a usable id, type, or billing-code mapping are
/// skipped with a logged error; Halo failures per appointment are recorded
/// as `error` results and the run continues.
pub fn execute<S: SeedStore>(
    ctx: &AppContext<S>,
    client: &dyn HaloClient,
    date: NaiveDate,
) -> Result<Value, AppError> {
    let codes = ctx.seeds().load_billing_codes()?;

    let midnight = NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is a valid time");
    let window_start = Utc.from_utc_datetime(&date.and_time(midnight));
    let window_end = window_start + chrono::Duration::days(1);

    let appointments = client.completed_appointments(window_start, window_end)?;

    let mut results: Vec<ClaimSubmissionResult> = Vec::new();
    let mut skipped = 0usize;
    for appointment in &appointments {
        let Some(appointment_id) = fhir::appointment_id(appointment) else {
            eprintln!("Skipping appointment without an identifier");
            skipped += 1;
            continue;
        };
        let Some(appointment_type) = fhir::appointment_type(appointment) else {
            eprintln!("Skipping appointment {appointment_id}: no appointment type");
            skipped += 1;
            continue;
        };
        let code = match codes.lookup(&appointment_type) {
            Ok(code) => code,
            Err(error) => {
                eprintln!("Skipping appointment {appointment_id}: {error}");
                skipped += 1;
                continue;
            }
        };

        let amount = match fhir::charge_amount(appointment, code) {
            Ok(amount) => amount,
            Err(error) => {
                eprintln!("Skipping appointment {appointment_id}: {error}");
                skipped += 1;
                continue;
            }
        };
        let resource = match fhir::build_claim_resource(appointment, code, amount) {
            Ok(resource) => resource,
            Err(error) => {
                eprintln!("Skipping appointment {appointment_id}: {error}");
                skipped += 1;
                continue;
            }
        };

        let outcome = claims::submit_and_track(
            client,
            &resource,
            format!("appt-{appointment_id}"),
            Some(appointment_id.clone()),
            Some(code.procedure_code.clone()),
            amount,
        );
        match outcome {
            Ok(result) => results.push(result),
            Err(error) => {
                eprintln!("Billing appointment {appointment_id} failed: {error}");
                results.push(ClaimSubmissionResult {
                    claim_id: format!("appt-{appointment_id}"),
                    appointment_id: Some(appointment_id),
                    status: "error".to_string(),
                    billing_code: Some(code.procedure_code.clone()),
                    amount,
                    rejection_reason: Some(error.to_string()),
                    submitted_at: Utc::now(),
                });
            }
        }
    }

    claims::append_claim_report(ctx, &results)?;

    let mut summary = claims::summarize(&results);
    let fields = summary.as_object_mut().expect("summary literal is an object");
    fields.insert("date".into(), json!(date));
    fields.insert("appointments".into(), json!(appointments.len()));
    fields.insert("skipped".into(), json!(skipped));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FilesystemSeedStore;
    use crate::domain::OrchestratorConfig;
    use chrono::DateTime;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct RecordingClient {
        appointments: Vec<Value>,
        submissions: Mutex<Vec<Value>>,
    }

    impl RecordingClient {
        fn new(appointments: Vec<Value>) -> Self {
            Self { appointments, submissions: Mutex::new(Vec::new()) }
        }
    }

    impl HaloClient for RecordingClient {
        fn completed_appointments(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Value>, AppError> {
            Ok(self.appointments.clone())
        }

        fn submit_claim(&self, resource: &Value) -> Result<Value, AppError> {
            self.submissions.lock().unwrap().push(resource.clone());
            Ok(json!({"id": "sub-1"}))
        }

        fn claim_status(&self, claim_id: &str) -> Result<Value, AppError> {
            Ok(json!({"id": claim_id, "status": "accepted"}))
        }
    }

    fn context_with_codes(json: &str) -> (TempDir, AppContext<FilesystemSeedStore>) {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("billing_codes.json"), json).unwrap();
        let config = OrchestratorConfig::defaults_for(dir.path());
        let seeds = FilesystemSeedStore::new(&config.data_dir);
        let ctx = AppContext::new(dir.path(), config, seeds);
        (dir, ctx)
    }

    fn completed_appointment() -> Value {
        json!({
            "id": "appt-77",
            "appointmentType": "sick_visit",
            "patientId": "p-9",
            "practitionerId": "dr-2",
            "start": "2026-03-02T10:00:00Z",
            "end": "2026-03-02T10:20:00Z",
        })
    }

    #[test]
    fn bills_completed_appointments_with_mapped_codes() {
        let (_dir, ctx) = context_with_codes(
            r#"{"sick_visit": {"procedure_code": "99213", "charge_amount": "75.00"}}"#,
        );
        let client = RecordingClient::new(vec![completed_appointment()]);

        let summary =
            execute(&ctx, &client, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).unwrap();
        assert_eq!(summary["submitted"], 1);
        assert_eq!(summary["accepted"], 1);
        assert_eq!(summary["skipped"], 0);

        let submissions = client.submissions.lock().unwrap();
        let coding = &submissions[0]["item"][0]["productOrService"]["coding"][0];
        assert_eq!(coding["code"], "99213");
        assert_eq!(submissions[0]["total"]["value"], 75.0);
    }

    #[test]
    fn unmapped_appointment_types_are_skipped() {
        let (_dir, ctx) = context_with_codes(
            r#"{"annual_physical": {"procedure_code": "99395"}}"#,
        );
        let client = RecordingClient::new(vec![completed_appointment()]);

        let summary =
            execute(&ctx, &client, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).unwrap();
        assert_eq!(summary["submitted"], 0);
        assert_eq!(summary["skipped"], 1);
        assert!(client.submissions.lock().unwrap().is_empty());
    }

    #[test]
    fn appointments_without_ids_are_skipped() {
        let (_dir, ctx) = context_with_codes(
            r#"{"sick_visit": {"procedure_code": "99213"}}"#,
        );
        let client = RecordingClient::new(vec![json!({"appointmentType": "sick_visit"})]);

        let summary =
            execute(&ctx, &client, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).unwrap();
        assert_eq!(summary["appointments"], 1);
        assert_eq!(summary["skipped"], 1);
    }
}
