use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Base URL used when neither the config file nor the CLI names one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Base URL of the diagnosis service.
    pub api_url: Option<String>,
    /// Path to a patient record JSON file.
    pub record_path: Option<String>,
    /// Wallet account address to show once connected.
    pub wallet_address: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("medichain").join("config.json"))
    }
}
