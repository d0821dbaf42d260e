use chrono::{Datelike, NaiveDate, Utc, Weekday};
use serde_json::{Value, json};

use crate::adapters::render_compliance_report;
use crate::app::AppContext;
use crate::domain::{AppError, metrics};
use crate::ports::SeedStore;

const RECALLS_DATASET: &str = "recalls";
const CLAIMS_DATASET: &str = "claims";
const APPOINTMENTS_DATASET: &str = "appointments";

/// Generate the weekly compliance report for the ISO week containing
/// `week_of`.
pub fn execute<S: SeedStore>(ctx: &AppContext<S>, week_of: NaiveDate) -> Result<Value, AppError> {
    let recalls = ctx.seeds().load_dataset(RECALLS_DATASET, &["patient_id"])?;
    let claims = ctx.seeds().load_dataset(CLAIMS_DATASET, &["claim_id"])?;
    let appointments = ctx.seeds().load_dataset(APPOINTMENTS_DATASET, &["patient_id"])?;

    let summary = metrics::summarize(&recalls, &claims, &appointments);

    let iso = week_of.iso_week();
    let week_start = NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon)
        .ok_or_else(|| AppError::ReportRender(format!("no ISO week for {week_of}")))?;
    let week_end = week_start + chrono::Duration::days(6);

    let rendered = render_compliance_report(
        &summary,
        iso.year(),
        iso.week(),
        week_start,
        week_end,
        Utc::now(),
    )?;

    let reports_dir = &ctx.config().reports_dir;
    std::fs::create_dir_all(reports_dir)?;
    let file_name = format!("compliance_report_{}-W{:02}.md", iso.year(), iso.week());
    let path = reports_dir.join(&file_name);
    std::fs::write(&path, rendered)?;

    Ok(json!({
        "report": path.display().to_string(),
        "week": format!("{}-W{:02}", iso.year(), iso.week()),
        "metrics": summary,
    }))
}
