//! Orchestrator configuration: `zantra.toml` plus environment overrides.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::Deserialize;
use url::Url;

use crate::domain::AppError;
use crate::domain::schedule::parse_time_of_day;

pub const CONFIG_FILE_NAME: &str = "zantra.toml";

const ENV_DATA_DIR: &str = "DATA_DIR";
const ENV_FHIR_BASE_URL: &str = "HALO_FHIR_BASE_URL";
const ENV_TOKEN_URL: &str = "HALO_TOKEN_URL";
const ENV_CLIENT_ID: &str = "HALO_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "HALO_CLIENT_SECRET";
const ENV_SCOPE: &str = "HALO_SCOPE";
const ENV_AUDIENCE: &str = "HALO_AUDIENCE";

/// Halo Connect endpoint and transport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HaloConfig {
    pub base_url: Url,
    pub token_url: Url,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub token_refresh_buffer_secs: u64,
}

impl Default for HaloConfig {
    fn default() -> Self {
        HaloConfig {
            base_url: Url::parse("https://api.haloconnect.com/fhir")
                .expect("default base url is valid"),
            token_url: Url::parse("https://api.haloconnect.com/oauth2/token")
                .expect("default token url is valid"),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 500,
            token_refresh_buffer_secs: 60,
        }
    }
}

/// OAuth2 client credentials, sourced from the environment only.
#[derive(Clone)]
pub struct HaloCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub audience: String,
}

impl std::fmt::Debug for HaloCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HaloCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl HaloCredentials {
    pub fn from_env() -> Result<Self, AppError> {
        let client_id = require_env(ENV_CLIENT_ID)?;
        let client_secret = require_env(ENV_CLIENT_SECRET)?;
        Ok(HaloCredentials {
            client_id,
            client_secret,
            scope: std::env::var(ENV_SCOPE).unwrap_or_default(),
            audience: std::env::var(ENV_AUDIENCE).unwrap_or_default(),
        })
    }

    /// Whether credentials are present, without reading their values.
    pub fn present_in_env() -> bool {
        std::env::var(ENV_CLIENT_ID).is_ok_and(|v| !v.is_empty())
            && std::env::var(ENV_CLIENT_SECRET).is_ok_and(|v| !v.is_empty())
    }
}

fn require_env(name: &str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::EnvironmentVariableMissing(name.to_string())),
    }
}

/// Daily schedule settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    pub recalls_at: NaiveTime,
    pub claims_at: NaiveTime,
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            recalls_at: NaiveTime::from_hms_opt(9, 0, 0).expect("valid default time"),
            claims_at: NaiveTime::from_hms_opt(17, 0, 0).expect("valid default time"),
            poll_interval_secs: 60,
        }
    }
}

/// Fully resolved orchestrator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub task_log_path: PathBuf,
    pub schedule: ScheduleConfig,
    pub halo: HaloConfig,
}

impl OrchestratorConfig {
    /// Load configuration for a workspace root: `zantra.toml` when present,
    /// defaults otherwise, then environment overrides.
    pub fn load(root: &Path) -> Result<Self, AppError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse_toml(&content, root)?
        } else {
            Self::defaults_for(root)
        };
        config.apply_env_overrides(root)?;
        Ok(config)
    }

    pub fn defaults_for(root: &Path) -> Self {
        OrchestratorConfig {
            data_dir: root.join("data"),
            reports_dir: root.join("reports"),
            task_log_path: root.join("task_log.json"),
            schedule: ScheduleConfig::default(),
            halo: HaloConfig::default(),
        }
    }

    pub fn parse_toml(content: &str, root: &Path) -> Result<Self, AppError> {
        let dto: ConfigDto = toml::from_str(content)?;
        dto.resolve(root)
    }

    fn apply_env_overrides(&mut self, root: &Path) -> Result<(), AppError> {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR)
            && !dir.is_empty()
        {
            self.data_dir = resolve_path(root, &dir);
        }
        if let Ok(url) = std::env::var(ENV_FHIR_BASE_URL)
            && !url.is_empty()
        {
            self.halo.base_url = parse_url(&url, ENV_FHIR_BASE_URL)?;
        }
        if let Ok(url) = std::env::var(ENV_TOKEN_URL)
            && !url.is_empty()
        {
            self.halo.token_url = parse_url(&url, ENV_TOKEN_URL)?;
        }
        Ok(())
    }
}

fn parse_url(raw: &str, origin: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::config_error(format!("Invalid URL in {origin}: {e}")))
}

fn resolve_path(root: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() { path } else { root.join(path) }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDto {
    data: Option<DataDto>,
    schedule: Option<ScheduleDto>,
    halo: Option<HaloDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataDto {
    dir: Option<String>,
    reports_dir: Option<String>,
    task_log: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleDto {
    recalls_at: Option<String>,
    claims_at: Option<String>,
    poll_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HaloDto {
    base_url: Option<Url>,
    token_url: Option<Url>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    token_refresh_buffer_secs: Option<u64>,
}

impl ConfigDto {
    fn resolve(self, root: &Path) -> Result<OrchestratorConfig, AppError> {
        let defaults = OrchestratorConfig::defaults_for(root);

        let data = self.data.unwrap_or_default();
        let data_dir =
            data.dir.map(|d| resolve_path(root, &d)).unwrap_or(defaults.data_dir);
        let reports_dir =
            data.reports_dir.map(|d| resolve_path(root, &d)).unwrap_or(defaults.reports_dir);
        let task_log_path =
            data.task_log.map(|d| resolve_path(root, &d)).unwrap_or(defaults.task_log_path);

        let schedule_dto = self.schedule.unwrap_or_default();
        let schedule = ScheduleConfig {
            recalls_at: schedule_dto
                .recalls_at
                .map(|raw| parse_time_of_day(&raw))
                .transpose()?
                .unwrap_or(defaults.schedule.recalls_at),
            claims_at: schedule_dto
                .claims_at
                .map(|raw| parse_time_of_day(&raw))
                .transpose()?
                .unwrap_or(defaults.schedule.claims_at),
            poll_interval_secs: schedule_dto
                .poll_interval_secs
                .unwrap_or(defaults.schedule.poll_interval_secs)
                .max(1),
        };

        let halo_dto = self.halo.unwrap_or_default();
        let halo = HaloConfig {
            base_url: halo_dto.base_url.unwrap_or(defaults.halo.base_url),
            token_url: halo_dto.token_url.unwrap_or(defaults.halo.token_url),
            timeout_secs: halo_dto.timeout_secs.unwrap_or(defaults.halo.timeout_secs),
            max_retries: halo_dto.max_retries.unwrap_or(defaults.halo.max_retries),
            retry_delay_ms: halo_dto.retry_delay_ms.unwrap_or(defaults.halo.retry_delay_ms),
            token_refresh_buffer_secs: halo_dto
                .token_refresh_buffer_secs
                .unwrap_or(defaults.halo.token_refresh_buffer_secs),
        };

        Ok(OrchestratorConfig { data_dir, reports_dir, task_log_path, schedule, halo })
    }
}
