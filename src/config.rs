// Configuration management

use crate::api::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{ChmError, Result};
use crate::resilience::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding `api_base_url`
pub const ENV_BASE_URL: &str = "CHM_API_BASE_URL";

/// Environment variable overriding `session_cookie`
pub const ENV_SESSION: &str = "CHM_SESSION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub timeout_secs: u64,
    /// Cookie sent with every request, e.g. `session=abc123`
    pub session_cookie: Option<String>,
    pub poll_interval_secs: u64,
    /// Wait before re-fetching status after an accepted action
    pub confirm_delay_ms: u64,
    /// Log entries shown per collection
    pub log_lines: usize,
    /// Attempts for status fetches (1 disables retries)
    pub retries: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            session_cookie: None,
            poll_interval_secs: 5,
            confirm_delay_ms: 1500,
            log_lines: 10,
            retries: 1,
            log_file: None,
        }
    }
}

impl Config {
    /// Get default config path: ~/.config/chmctl/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("chmctl").join("config.yaml"))
    }

    /// Load config from path, falling back to defaults if not found.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().unwrap_or_default());

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_yaml::from_str(&contents)?;
            tracing::debug!("Loaded config from {}", config_path.display());
            config
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `CHM_API_BASE_URL` and `CHM_SESSION`
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.trim().is_empty() {
                self.api_base_url = base_url.trim().to_string();
            }
        }
        if let Ok(session) = std::env::var(ENV_SESSION) {
            if !session.trim().is_empty() {
                self.session_cookie = Some(session.trim().to_string());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            ChmError::Config(format!("api_base_url {:?} is not a URL: {}", self.api_base_url, e))
        })?;
        if self.timeout_secs == 0 {
            return Err(ChmError::Config("timeout_secs must be greater than 0".to_string()).into());
        }
        if self.poll_interval_secs == 0 {
            return Err(ChmError::Config("poll_interval_secs must be greater than 0".to_string()).into());
        }
        Ok(())
    }

    /// Save config to path
    pub fn save(&self, path: PathBuf) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            session_cookie: self.session_cookie.clone(),
            ..ClientConfig::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Backoff::default())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("chmctl.log"))
    }
}
