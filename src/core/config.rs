use crate::core::quote::Instrument;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvdsProviderConfig {
    pub base_url: String,
    /// Series API key. Falls back to the `EVDS_API_KEY` environment variable;
    /// without either, the primary tier is skipped.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpotProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub evds: Option<EvdsProviderConfig>,
    pub spot: Option<SpotProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            evds: Some(EvdsProviderConfig {
                base_url: "https://evds2.tcmb.gov.tr".to_string(),
                api_key: None,
            }),
            spot: Some(SpotProviderConfig {
                base_url: "https://api.exchangerate-api.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchConfig {
    /// Minimum gap between upstream fetch attempts.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Cadence of the `rates --watch` loop.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_min_interval_ms() -> u64 {
    15_000
}

fn default_refresh_secs() -> u64 {
    300
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            min_interval_ms: default_min_interval_ms(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

fn default_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new("USD", "US Dollar", false),
        Instrument::new("EUR", "Euro", false),
        Instrument::new("GBP", "British Pound", false),
        Instrument::new("JPY", "Japanese Yen", false),
        Instrument::new("CHF", "Swiss Franc", false),
        Instrument::new("XAU", "Gold (oz)", true),
        Instrument::new("XAG", "Silver (oz)", true),
        Instrument::new("XPT", "Platinum (oz)", true),
        Instrument::new("XPD", "Palladium (oz)", true),
    ]
}

fn default_home_currency() -> String {
    "TRY".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency every quote is expressed in.
    #[serde(default = "default_home_currency")]
    pub home_currency: String,
    #[serde(default = "default_instruments")]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            home_currency: default_home_currency(),
            instruments: default_instruments(),
            providers: ProvidersConfig::default(),
            fetch: FetchConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fina", "fina")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fina", "fina")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Effective EVDS key: explicit config wins over the environment.
    pub fn evds_api_key(&self) -> Option<String> {
        self.providers
            .evds
            .as_ref()
            .and_then(|p| p.api_key.clone())
            .or_else(|| std::env::var("EVDS_API_KEY").ok())
    }
}
