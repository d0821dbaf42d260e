//! Markdown rendering for the weekly compliance report.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use minijinja::{Environment, UndefinedBehavior, context};

use crate::domain::{AppError, MetricSummary};

const COMPLIANCE_TEMPLATE: &str = include_str!("../assets/templates/compliance_report.md.j2");

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env
    })
}

/// Render the compliance report for the ISO week spanning
/// `week_start..=week_end`.
pub fn render_compliance_report(
    summary: &MetricSummary,
    iso_year: i32,
    iso_week: u32,
    week_start: NaiveDate,
    week_end: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let rendered = environment()
        .render_str(
            COMPLIANCE_TEMPLATE,
            context! {
                iso_year => iso_year,
                iso_week => format!("{iso_week:02}"),
                week_start => week_start.to_string(),
                week_end => week_end.to_string(),
                generated_at => generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                recall_completion_rate => format!("{:.1}", summary.recall_completion_rate),
                completed_recalls => summary.completed_recalls,
                total_recalls => summary.total_recalls,
                claim_rejection_rate => format!("{:.1}", summary.claim_rejection_rate),
                rejected_claims => summary.rejected_claims,
                total_claims => summary.total_claims,
                average_wait_time_minutes => format!("{:.1}", summary.average_wait_time_minutes),
                appointments_with_wait_time => summary.appointments_with_wait_time,
                total_appointments => summary.total_appointments,
            },
        )
        .map_err(|e| AppError::ReportRender(e.to_string()))?;
    Ok(rendered)
}
