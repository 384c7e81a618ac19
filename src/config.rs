// ⚙️ Configuration - Defaults for rates, party size and the server address
// Read from <config_dir>/bill-splitter/config.toml; every field is optional

use crate::calculator::Rates;
use crate::input::ValidationResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tax percentage pre-filled for new sessions
    pub tax_percent: f64,

    /// Tip percentage pre-filled for new sessions
    pub tip_percent: f64,

    /// Number of people splitting the whole bill
    pub party_size: usize,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub address: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tax_percent: 0.0,
            tip_percent: 0.0,
            party_size: 1,
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Load from the config directory, or defaults if there is no file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Config::default())
            }
            None => {
                warn!("no config directory on this platform, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Write to the config directory, creating it if needed
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bill-splitter").join("config.toml"))
    }

    /// Write the default config file and return where it went
    pub fn init_default() -> Result<PathBuf> {
        let path = Self::config_path().context("No config directory on this platform")?;
        Config::default().save_to(&path)?;
        Ok(path)
    }

    /// Default rates, validated
    pub fn rates(&self) -> ValidationResult<Rates> {
        Rates::new(self.tax_percent, self.tip_percent)
    }
}
