use std::sync::atomic::AtomicBool;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use zantra::{AppError, Severity};

#[derive(Parser)]
#[command(name = "zantra")]
#[command(version)]
#[command(
    about = "Medical practice back-office orchestrator (recalls, claims, billing, compliance)",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold zantra.toml and sample seed data in the current directory
    Init,
    /// Run the daily polling scheduler (default when no command is given)
    RunScheduler,
    /// Run the recall workflow once
    RunRecalls {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Submit pending seed claims once
    RunClaims {
        /// Print what would be submitted instead of calling Halo
        #[arg(long)]
        dry_run: bool,
    },
    /// Bill completed appointments for a day
    RunBilling {
        /// Target date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print what would be submitted instead of calling Halo
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate the weekly compliance report
    Report {
        /// A date inside the target ISO week (default: today)
        #[arg(long)]
        week_of: Option<NaiveDate>,
    },
    /// Show recent task-log entries
    Status {
        /// Number of entries to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Check configuration, seed data, and credentials
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), AppError> = match cli.command {
        Some(Commands::Init) => zantra::init(),
        Some(Commands::RunScheduler) | None => {
            let stop = AtomicBool::new(false);
            zantra::run_scheduler(&stop)
        }
        Some(Commands::RunRecalls { as_of }) => zantra::run_recalls(as_of).map(|_| ()),
        Some(Commands::RunClaims { dry_run }) => zantra::run_claims(dry_run).map(|_| ()),
        Some(Commands::RunBilling { date, dry_run }) => {
            zantra::run_billing(date, dry_run).map(|_| ())
        }
        Some(Commands::Report { week_of }) => zantra::report(week_of).map(|_| ()),
        Some(Commands::Status { limit }) => print_status(limit),
        Some(Commands::Doctor) => run_doctor(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_status(limit: usize) -> Result<(), AppError> {
    let entries = zantra::status(limit)?;
    if entries.is_empty() {
        println!("No task-log entries yet.");
        return Ok(());
    }
    for entry in entries {
        let mut line =
            format!("{}  {:<18} {}", entry.completed_at, entry.task, entry.status.as_str());
        if let Some(message) = &entry.message {
            line.push_str(&format!("  {message}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn run_doctor() -> Result<(), AppError> {
    let outcome = zantra::doctor()?;
    for diagnostic in &outcome.diagnostics {
        let symbol = match diagnostic.severity {
            Severity::Ok => "✅",
            Severity::Warning => "⚠️ ",
            Severity::Error => "❌",
        };
        println!("{symbol} {}", diagnostic.message);
    }
    println!("{} error(s), {} warning(s)", outcome.errors(), outcome.warnings());
    std::process::exit(outcome.exit_code());
}
