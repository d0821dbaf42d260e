use chrono::Utc;
use serde_json::{Value, json};

use crate::adapters::JsonHistory;
use crate::app::AppContext;
use crate::domain::{Amount, AppError, ClaimSubmissionResult, fhir};
use crate::ports::{HaloClient, SeedStore};

pub const CLAIM_REPORT_FILE: &str = "claim_report.json";

/// Submit every pending seed claim through Halo and record the outcomes.
pub fn execute<S: SeedStore>(
    ctx: &AppContext<S>,
    client: &dyn HaloClient,
) -> Result<Value, AppError> {
    let pending = ctx.seeds().load_pending_claims()?;

    let mut results = Vec::with_capacity(pending.len());
    for claim in &pending {
        let resource = fhir::build_seed_claim_resource(claim);
        let result = submit_and_track(
            client,
            &resource,
            claim.claim_id.clone(),
            None,
            None,
            claim.amount,
        );
        match result {
            Ok(outcome) => results.push(outcome),
            Err(error) => {
                // Per-claim failures are recorded and the run continues.
                eprintln!("Claim {} failed: {error}", claim.claim_id);
                results.push(ClaimSubmissionResult {
                    claim_id: claim.claim_id.clone(),
                    appointment_id: None,
                    status: "error".to_string(),
                    billing_code: None,
                    amount: claim.amount,
                    rejection_reason: Some(error.to_string()),
                    submitted_at: Utc::now(),
                });
            }
        }
    }

    append_claim_report(ctx, &results)?;
    Ok(summarize(&results))
}

/// POST a claim resource, then fetch and classify its status.
pub fn submit_and_track(
    client: &dyn HaloClient,
    resource: &Value,
    claim_id: String,
    appointment_id: Option<String>,
    billing_code: Option<String>,
    amount: Amount,
) -> Result<ClaimSubmissionResult, AppError> {
    let submission = client.submit_claim(resource)?;
    let submission_id = fhir::submission_id(&submission).ok_or_else(|| AppError::HaloApi {
        message: "Claim submission response carried no identifier".to_string(),
        status: None,
    })?;

    let payload = client.claim_status(&submission_id)?;
    let (status, rejection_reason) = fhir::parse_claim_status(&payload);

    Ok(ClaimSubmissionResult {
        claim_id,
        appointment_id,
        status,
        billing_code,
        amount,
        rejection_reason,
        submitted_at: Utc::now(),
    })
}

/// Append submission outcomes to `reports/claim_report.json`.
pub fn append_claim_report<S: SeedStore>(
    ctx: &AppContext<S>,
    results: &[ClaimSubmissionResult],
) -> Result<(), AppError> {
    let records = results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    JsonHistory::new(ctx.config().reports_dir.join(CLAIM_REPORT_FILE)).append(records)
}

/// Run summary recorded in the task log.
pub fn summarize(results: &[ClaimSubmissionResult]) -> Value {
    let rejected = results.iter().filter(|r| r.is_rejected()).count();
    let accepted = results.len() - rejected;
    json!({
        "submitted": results.len(),
        "accepted": accepted,
        "rejected": rejected,
        "results": results,
    })
}
