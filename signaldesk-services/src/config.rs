//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use signaldesk_core::backtest::{BacktestSettings, RiskMetricsMode};
use signaldesk_core::catalog::DEFAULT_TIMEFRAMES;

/// Environment variable that overrides `store.dir`.
pub const STORE_DIR_ENV: &str = "SIGNALDESK_STORE_DIR";

pub const DEFAULT_CONFIG_FILE: &str = "signaldesk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".signaldesk"),
            backend: StoreBackend::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    /// Timeframes a new board row starts with.
    pub default_timeframes: Vec<String>,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            default_timeframes: DEFAULT_TIMEFRAMES.iter().map(|tf| tf.to_string()).collect(),
        }
    }
}

/// Backtest defaults. `None` fields fall back to the built-in settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Master seed; when set, runs are reproducible.
    pub seed: Option<u64>,
    pub risk_metrics: RiskMetricsMode,
    pub initial_capital: Option<f64>,
    pub position_size: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub timeframe: Option<String>,
}

impl BacktestConfig {
    /// Built-in defaults with configured overrides applied.
    pub fn settings(&self, today: NaiveDate) -> BacktestSettings {
        let mut settings = BacktestSettings::defaults(self.timeframe.as_deref(), today);
        if let Some(v) = self.initial_capital {
            settings.initial_capital = v;
        }
        if let Some(v) = self.position_size {
            settings.position_size = v;
        }
        if let Some(v) = self.stop_loss {
            settings.stop_loss = v;
        }
        if let Some(v) = self.take_profit {
            settings.take_profit = v;
        }
        settings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub signals: SignalsConfig,
    pub backtest: BacktestConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or defaults when it does not exist. The
    /// `SIGNALDESK_STORE_DIR` override is applied either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&content, path)?
        } else {
            Self::default()
        };
        config.apply_store_dir_override(std::env::var(STORE_DIR_ENV).ok());
        Ok(config)
    }

    pub fn apply_store_dir_override(&mut self, dir: Option<String>) {
        if let Some(dir) = dir.filter(|d| !d.trim().is_empty()) {
            self.store.dir = PathBuf::from(dir);
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
