//! Seed data store reading JSON files from the configured data directory.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::metrics::has_required_fields;
use crate::domain::{AppError, AppointmentRecord, BillingCodeTable, PendingClaim};
use crate::ports::SeedStore;

pub const APPOINTMENTS_FILE: &str = "appointments.json";
pub const CLAIMS_FILE: &str = "claims.json";
pub const BILLING_CODES_FILE: &str = "billing_codes.json";

/// `SeedStore` over a data directory of optional JSON files.
#[derive(Debug, Clone)]
pub struct FilesystemSeedStore {
    data_dir: PathBuf,
}

impl FilesystemSeedStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        FilesystemSeedStore { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Read and parse an optional JSON file. Missing and empty files read as
    /// `None`; anything unparseable is an error naming the file.
    fn read_optional(&self, file_name: &str) -> Result<Option<Value>, AppError> {
        let path = self.data_dir.join(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&raw)
            .map_err(|e| AppError::seed_error(path.display(), e.to_string()))?;
        Ok(Some(value))
    }

    fn read_optional_list(&self, file_name: &str) -> Result<Vec<Value>, AppError> {
        let Some(value) = self.read_optional(file_name)? else {
            return Ok(Vec::new());
        };
        match value {
            Value::Array(entries) => Ok(entries),
            _ => Err(AppError::seed_error(
                self.data_dir.join(file_name).display(),
                "expected a JSON list of records",
            )),
        }
    }
}

impl SeedStore for FilesystemSeedStore {
    fn load_appointments(&self) -> Result<Vec<AppointmentRecord>, AppError> {
        let path = self.data_dir.join(APPOINTMENTS_FILE);
        self.read_optional_list(APPOINTMENTS_FILE)?
            .iter()
            .map(|entry| {
                AppointmentRecord::from_value(entry)
                    .map_err(|e| AppError::seed_error(path.display(), e.to_string()))
            })
            .collect()
    }

    fn load_pending_claims(&self) -> Result<Vec<PendingClaim>, AppError> {
        let path = self.data_dir.join(CLAIMS_FILE);
        self.read_optional_list(CLAIMS_FILE)?
            .iter()
            .map(|entry| {
                PendingClaim::from_value(entry)
                    .map_err(|e| AppError::seed_error(path.display(), e.to_string()))
            })
            .collect()
    }

    fn load_billing_codes(&self) -> Result<BillingCodeTable, AppError> {
        let Some(value) = self.read_optional(BILLING_CODES_FILE)? else {
            return Ok(BillingCodeTable::default());
        };
        serde_json::from_value(value).map_err(|e| {
            AppError::seed_error(self.data_dir.join(BILLING_CODES_FILE).display(), e.to_string())
        })
    }

    fn load_dataset(&self, name: &str, required: &[&str]) -> Result<Vec<Value>, AppError> {
        let entries = self.read_optional_list(&format!("{name}.json"))?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_object() && has_required_fields(entry, required))
            .collect())
    }
}
