//! Append-only JSON array files used for run histories.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::AppError;

/// A history file holding a pretty-printed JSON array of records.
///
/// Reads tolerate a missing or empty file; a file that exists but does not
/// parse as a JSON array is a hard error so silent truncation never happens.
#[derive(Debug, Clone)]
pub struct JsonHistory {
    path: PathBuf,
}

impl JsonHistory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonHistory { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<Value>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::TaskLogCorrupted(e.to_string()))?;
        match value {
            Value::Array(entries) => Ok(entries),
            _ => Err(AppError::TaskLogCorrupted(
                format!("{} must contain a JSON list of entries", self.path.display()),
            )),
        }
    }

    pub fn append(&self, records: Vec<Value>) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut history = self.read()?;
        history.extend(records);
        self.write(&history)
    }

    fn write(&self, history: &[Value]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(history)?;
        std::fs::write(&self.path, format!("{serialized}\n"))?;
        Ok(())
    }
}
