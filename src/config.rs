use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_POLYGON_BASE_URL: &str = "https://api.polygon.io";
pub const DEFAULT_COINBASE_BASE_URL: &str = "https://api.coinbase.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolygonProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinbaseProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub polygon: Option<PolygonProviderConfig>,
    pub coinbase: Option<CoinbaseProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            polygon: Some(PolygonProviderConfig {
                base_url: DEFAULT_POLYGON_BASE_URL.to_string(),
            }),
            coinbase: Some(CoinbaseProviderConfig {
                base_url: DEFAULT_COINBASE_BASE_URL.to_string(),
            }),
        }
    }
}

fn default_bot_name() -> String {
    "tickerbot".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Handle stripped from `@botname` command mentions.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            bot_name: default_bot_name(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when no file
    /// exists. The bot is usable without any configuration on disk.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "tickerbot", "tickerbot")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn polygon_base_url(&self) -> &str {
        self.providers
            .polygon
            .as_ref()
            .map_or(DEFAULT_POLYGON_BASE_URL, |p| &p.base_url)
    }

    pub fn coinbase_base_url(&self) -> &str {
        self.providers
            .coinbase
            .as_ref()
            .map_or(DEFAULT_COINBASE_BASE_URL, |p| &p.base_url)
    }

    /// The market-data credential. Its absence is a degraded mode, not an
    /// error: stock commands reply with a configuration message while crypto
    /// and static commands keep working.
    pub fn polygon_api_key() -> Option<String> {
        std::env::var("POLYGON_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
    }
}
