use crate::app::AppContext;
use crate::domain::{AppError, HaloCredentials};
use crate::ports::SeedStore;

/// Severity of one diagnostic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Aggregate outcome of the environment checks.
#[derive(Debug, Clone)]
pub struct DoctorOutcome {
    pub diagnostics: Vec<Diagnostic>,
}

impl DoctorOutcome {
    pub fn errors(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors() > 0 { 1 } else { 0 }
    }
}

/// Check the workspace: data directory, seed files, task log, credentials.
pub fn execute<S: SeedStore>(ctx: &AppContext<S>) -> Result<DoctorOutcome, AppError> {
    let mut diagnostics = Vec::new();

    let data_dir = &ctx.config().data_dir;
    if data_dir.is_dir() {
        record_ok(&mut diagnostics, format!("data directory: {}", data_dir.display()));
    } else {
        record_error(
            &mut diagnostics,
            format!("data directory missing: {} (run `zantra init`)", data_dir.display()),
        );
    }

    check_seed(&mut diagnostics, "appointments.json", || {
        ctx.seeds().load_appointments().map(|records| records.len())
    });
    check_seed(&mut diagnostics, "claims.json", || {
        ctx.seeds().load_pending_claims().map(|claims| claims.len())
    });
    check_seed(&mut diagnostics, "billing_codes.json", || {
        ctx.seeds().load_billing_codes().map(|table| table.len())
    });

    match ctx.task_log().entries() {
        Ok(entries) => {
            record_ok(&mut diagnostics, format!("task log: {} entries", entries.len()))
        }
        Err(error) => record_error(&mut diagnostics, format!("task log: {error}")),
    }

    if HaloCredentials::present_in_env() {
        record_ok(&mut diagnostics, "Halo credentials present in environment".to_string());
    } else {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: "HALO_CLIENT_ID / HALO_CLIENT_SECRET not set; claim submission will fail"
                .to_string(),
        });
    }

    Ok(DoctorOutcome { diagnostics })
}

fn check_seed<F>(diagnostics: &mut Vec<Diagnostic>, name: &str, load: F)
where
    F: FnOnce() -> Result<usize, AppError>,
{
    match load() {
        Ok(count) => record_ok(diagnostics, format!("{name}: {count} records")),
        Err(error) => record_error(diagnostics, format!("{name}: {error}")),
    }
}

fn record_ok(diagnostics: &mut Vec<Diagnostic>, message: String) {
    diagnostics.push(Diagnostic { severity: Severity::Ok, message });
}

fn record_error(diagnostics: &mut Vec<Diagnostic>, message: String) {
    diagnostics.push(Diagnostic { severity: Severity::Error, message });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FilesystemSeedStore;
    use crate::domain::OrchestratorConfig;
    use serial_test::serial;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext<FilesystemSeedStore> {
        let config = OrchestratorConfig::defaults_for(dir.path());
        let seeds = FilesystemSeedStore::new(&config.data_dir);
        AppContext::new(dir.path(), config, seeds)
    }

    #[test]
    #[serial]
    fn missing_data_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let outcome = execute(&context(&dir)).unwrap();
        assert!(outcome.errors() >= 1);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    #[serial]
    fn scaffolded_workspace_passes_with_credentials_warning_at_most() {
        let dir = TempDir::new().unwrap();
        crate::adapters::deploy_scaffold(dir.path()).unwrap();

        let outcome = execute(&context(&dir)).unwrap();
        assert_eq!(outcome.errors(), 0, "diagnostics: {:?}", outcome.diagnostics);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    #[serial]
    fn malformed_seed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("claims.json"), "{broken").unwrap();

        let outcome = execute(&context(&dir)).unwrap();
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("claims.json")));
    }
}
