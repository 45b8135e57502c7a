use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::GenerationMode;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const ENV_SERVICE_URL: &str = "PROMPTSMITH_SERVICE_URL";
pub const ENV_MODE: &str = "PROMPTSMITH_MODE";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub mode: Option<String>,
    pub service_url: Option<String>,
    pub simulated_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            mode: Some(GenerationMode::Local.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(())
    }

    /// Environment variables win over the file.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_SERVICE_URL).filter(|v| !v.trim().is_empty()) {
            self.service_url = Some(url);
        }
        if let Some(mode) = lookup(ENV_MODE).filter(|v| !v.trim().is_empty()) {
            self.mode = Some(mode);
        }
    }

    pub fn mode(&self) -> Result<GenerationMode> {
        match self.mode.as_deref() {
            None => Ok(GenerationMode::default()),
            Some(raw) => raw.parse().map_err(|e: String| anyhow!(e)),
        }
    }

    pub fn service_url(&self) -> String {
        self.service_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string())
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms.unwrap_or(DEFAULT_SIMULATED_DELAY_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Where saved prompts go: configured directory, else the user's
    /// download folder, else the working directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("promptsmith"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
