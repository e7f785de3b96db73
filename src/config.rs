use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GannotError;
use crate::fetch::RetryPolicy;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 200;
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub max_batch_size: Option<usize>,
    #[serde(default)]
    pub uniprot_fallback_enabled: Option<bool>,
    #[serde(default)]
    pub ncbi_fallback_enabled: Option<bool>,
    #[serde(default)]
    pub retry_max_attempts: Option<u32>,
    #[serde(default)]
    pub base_backoff_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_delay_ms: Option<u64>,
    #[serde(default)]
    pub batch_deadline_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub max_batch_size: usize,
    pub uniprot_enabled: bool,
    pub ncbi_enabled: bool,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub request_delay: Duration,
    pub batch_deadline: Option<Duration>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub version: String,
    pub max_batch_size: usize,
    pub uniprot_fallback_enabled: bool,
    pub ncbi_fallback_enabled: bool,
    pub retry_max_attempts: u32,
    pub base_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub batch_deadline_secs: Option<u64>,
}

impl ResolvedConfig {
    pub fn report(&self) -> ConfigReport {
        ConfigReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            max_batch_size: self.max_batch_size,
            uniprot_fallback_enabled: self.uniprot_enabled,
            ncbi_fallback_enabled: self.ncbi_enabled,
            retry_max_attempts: self.retry.max_attempts,
            base_backoff_ms: self.retry.base_backoff.as_millis() as u64,
            request_timeout_secs: self.request_timeout.as_secs(),
            request_delay_ms: self.request_delay.as_millis() as u64,
            batch_deadline_secs: self.batch_deadline.map(|deadline| deadline.as_secs()),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GannotError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("gannot.json"),
        };

        // the default config file is optional; an explicit one is not
        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GannotError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| GannotError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        ResolvedConfig {
            max_batch_size: config.max_batch_size.unwrap_or(DEFAULT_MAX_BATCH_SIZE),
            uniprot_enabled: config.uniprot_fallback_enabled.unwrap_or(true),
            ncbi_enabled: config.ncbi_fallback_enabled.unwrap_or(true),
            retry: RetryPolicy {
                max_attempts: config
                    .retry_max_attempts
                    .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS),
                base_backoff: Duration::from_millis(
                    config.base_backoff_ms.unwrap_or(DEFAULT_BASE_BACKOFF_MS),
                ),
            },
            request_timeout: Duration::from_secs(
                config
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            request_delay: Duration::from_millis(
                config.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS),
            ),
            batch_deadline: config.batch_deadline_secs.map(Duration::from_secs),
        }
    }
}
