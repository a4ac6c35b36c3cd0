use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk settings, stored as JSON under the platform config directory.
///
/// Every field is optional; a missing API key is not fatal at startup and
/// only surfaces when the first message is submitted.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: write a default file so there is something to edit
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The bearer credential: the OPENAI_API_KEY environment variable wins
    /// over the stored key.
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var("OPENAI_API_KEY").ok())
    }

    fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|k| !k.is_empty())
            .or_else(|| self.openai_api_key.clone())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("copilot").join("config.json"))
    }
}
