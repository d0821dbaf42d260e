//! zantra: back-office orchestrator for a medical practice.
//!
//! Seed-driven patient recalls, FHIR claim submission through Halo Connect,
//! daily billing, and weekly compliance reporting, all recorded in a JSON
//! task log.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use adapters::{FilesystemSeedStore, HttpHaloClient, RetryPolicy, RetryingHaloClient};
use app::commands::{billing, claims, doctor, init, recalls, report, run_logged, scheduler, status};
use app::{AppContext, commands::scheduler::{CLAIMS_TASK, RECALLS_TASK}};
use ports::{HaloClient, LogReminderSender, MockHaloClient};

pub use app::commands::doctor::{Diagnostic, DoctorOutcome, Severity};
pub use domain::{AppError, TaskLogEntry};

const BILLING_TASK: &str = "daily_billing";
const REPORT_TASK: &str = "compliance_report";

fn current_dir() -> Result<std::path::PathBuf, AppError> {
    Ok(std::env::current_dir()?)
}

/// Scaffold `zantra.toml` and sample seed data in the current directory.
pub fn init() -> Result<(), AppError> {
    init_at(&current_dir()?)
}

pub fn init_at(root: &Path) -> Result<(), AppError> {
    let written = init::execute(root)?;
    for path in &written {
        println!("  created {path}");
    }
    println!("✅ Initialized zantra workspace ({} files)", written.len());
    Ok(())
}

/// Run the recall workflow once.
pub fn run_recalls(as_of: Option<NaiveDate>) -> Result<Value, AppError> {
    run_recalls_at(&current_dir()?, as_of)
}

pub fn run_recalls_at(root: &Path, as_of: Option<NaiveDate>) -> Result<Value, AppError> {
    let ctx = AppContext::load(root)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let summary = run_logged(ctx.task_log(), RECALLS_TASK, || {
        recalls::execute(&ctx, &LogReminderSender, as_of)
    })?;
    println!("✅ Recalls scheduled: {}", summary["scheduled_count"]);
    Ok(summary)
}

/// Submit pending seed claims once. `dry_run` swaps in the mock client.
pub fn run_claims(dry_run: bool) -> Result<Value, AppError> {
    run_claims_at(&current_dir()?, dry_run)
}

pub fn run_claims_at(root: &Path, dry_run: bool) -> Result<Value, AppError> {
    let ctx = AppContext::load(root)?;
    let client = build_client(&ctx, dry_run)?;
    let summary =
        run_logged(ctx.task_log(), CLAIMS_TASK, || claims::execute(&ctx, client.as_ref()))?;
    println!(
        "✅ Claims submitted: {} ({} accepted, {} rejected)",
        summary["submitted"], summary["accepted"], summary["rejected"]
    );
    Ok(summary)
}

/// Bill completed appointments for a day (default: today).
pub fn run_billing(date: Option<NaiveDate>, dry_run: bool) -> Result<Value, AppError> {
    run_billing_at(&current_dir()?, date, dry_run)
}

pub fn run_billing_at(
    root: &Path,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<Value, AppError> {
    let ctx = AppContext::load(root)?;
    let client = build_client(&ctx, dry_run)?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let summary =
        run_logged(ctx.task_log(), BILLING_TASK, || billing::execute(&ctx, client.as_ref(), date))?;
    println!(
        "✅ Billed {} of {} completed appointments",
        summary["submitted"], summary["appointments"]
    );
    Ok(summary)
}

/// Run the daily polling scheduler until `stop` is raised.
pub fn run_scheduler(stop: &AtomicBool) -> Result<(), AppError> {
    run_scheduler_at(&current_dir()?, stop)
}

pub fn run_scheduler_at(root: &Path, stop: &AtomicBool) -> Result<(), AppError> {
    let ctx = AppContext::load(root)?;
    scheduler::execute(&ctx, stop)
}

/// Generate the weekly compliance report (default: the current ISO week).
pub fn report(week_of: Option<NaiveDate>) -> Result<Value, AppError> {
    report_at(&current_dir()?, week_of)
}

pub fn report_at(root: &Path, week_of: Option<NaiveDate>) -> Result<Value, AppError> {
    let ctx = AppContext::load(root)?;
    let week_of = week_of.unwrap_or_else(|| Local::now().date_naive());
    let summary = run_logged(ctx.task_log(), REPORT_TASK, || report::execute(&ctx, week_of))?;
    println!("✅ Compliance report written to {}", summary["report"].as_str().unwrap_or("?"));
    Ok(summary)
}

/// Recent task-log entries, oldest first.
pub fn status(limit: usize) -> Result<Vec<TaskLogEntry>, AppError> {
    status_at(&current_dir()?, limit)
}

pub fn status_at(root: &Path, limit: usize) -> Result<Vec<TaskLogEntry>, AppError> {
    let ctx = AppContext::load(root)?;
    status::execute(&ctx, limit)
}

/// Environment and seed-data diagnostics.
pub fn doctor() -> Result<DoctorOutcome, AppError> {
    doctor_at(&current_dir()?)
}

pub fn doctor_at(root: &Path) -> Result<DoctorOutcome, AppError> {
    let ctx = AppContext::load(root)?;
    doctor::execute(&ctx)
}

fn build_client(
    ctx: &AppContext<FilesystemSeedStore>,
    dry_run: bool,
) -> Result<Box<dyn HaloClient>, AppError> {
    if dry_run {
        return Ok(Box::new(MockHaloClient::default()));
    }
    let halo = &ctx.config().halo;
    let http = HttpHaloClient::from_env(halo)?;
    Ok(Box::new(RetryingHaloClient::new(Box::new(http), RetryPolicy::from_config(halo))))
}
