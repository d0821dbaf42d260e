use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Library-wide error type for zantra operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    EnvironmentVariableMissing(String),

    /// Data directory already scaffolded at the target location.
    #[error("Data directory already exists at {0}")]
    DataDirExists(PathBuf),

    /// A seed data file contains malformed or invalid content.
    #[error("Invalid seed data in {path}: {detail}")]
    SeedData { path: String, detail: String },

    /// A currency amount could not be parsed.
    #[error("Invalid currency amount: {0}")]
    InvalidAmount(String),

    /// An appointment date was not in a recognized format.
    #[error("Invalid appointment date '{0}': dates must be ISO formatted")]
    InvalidDate(String),

    /// A pending claim entry failed validation.
    #[error("Invalid claim entry: {0}")]
    InvalidClaim(String),

    /// No billing code mapping exists for an appointment type.
    #[error("No billing code mapping found for appointment type '{0}'")]
    BillingCodeMissing(String),

    /// The task log on disk cannot be parsed.
    #[error("Task log is corrupted and cannot be parsed: {0}")]
    TaskLogCorrupted(String),

    /// Halo Connect authentication failed.
    #[error("Halo Connect authentication failed: {0}")]
    HaloAuth(String),

    /// Halo Connect API request failed.
    #[error("{message}")]
    HaloApi { message: String, status: Option<u16> },

    /// Compliance report rendering failed.
    #[error("Report rendering failed: {0}")]
    ReportRender(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn seed_error<P: std::fmt::Display, S: Into<String>>(path: P, detail: S) -> Self {
        AppError::SeedData { path: path.to_string(), detail: detail.into() }
    }
}
