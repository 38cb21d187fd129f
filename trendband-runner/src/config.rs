//! TOML run configuration.
//!
//! A config file names the basket, the band parameters, where the prices
//! live, and where artifacts go. Everything except `[[assets]]` has a
//! default, and [`RunConfig::default_preset`] fills in the assets too.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trendband_core::domain::strategy::{DEFAULT_BAND, DEFAULT_WINDOWS};
use trendband_core::{Asset, CoreError, ScalarTable, SignalMode, Strategy, Window};

use crate::data_loader::CsvLayout;

/// Errors from reading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] CoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Moving-average lengths in trading days, ascending.
    pub windows: Vec<usize>,
    /// Band half-width as a fraction of the average, shared by every window.
    pub band_width: f64,
    /// Per-window band widths; overrides `band_width` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_widths: Option<Vec<f64>>,
    /// Scalar for each score from 0 to the window count.
    pub scalars: Vec<f64>,
    pub mode: SignalMode,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            band_width: DEFAULT_BAND,
            band_widths: None,
            scalars: ScalarTable::default_three_window().values().to_vec(),
            mode: SignalMode::Hysteresis,
        }
    }
}

impl StrategyConfig {
    fn to_windows(&self) -> Result<Vec<Window>, CoreError> {
        match &self.band_widths {
            None => Ok(self
                .windows
                .iter()
                .map(|&len| Window::new(len, self.band_width))
                .collect()),
            Some(bands) if bands.len() == self.windows.len() => Ok(self
                .windows
                .iter()
                .zip(bands)
                .map(|(&len, &band)| Window::new(len, band))
                .collect()),
            Some(bands) => Err(CoreError::invalid_config(format!(
                "{} band widths given for {} windows",
                bands.len(),
                self.windows.len()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Wide CSV: one date column plus one close column per symbol.
    pub prices: PathBuf,
    pub date_column: String,
    /// chrono format string for the date column.
    pub date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices: PathBuf::from("data/prices.csv"),
            date_column: "date".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl DataConfig {
    pub fn layout(&self) -> CsvLayout {
        CsvLayout {
            date_column: self.date_column.clone(),
            date_format: self.date_format.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Run on weekends too, against the last Friday.
    pub test_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Also write the replayed per-day states as CSV.
    pub write_history: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("signals"),
            write_history: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.to_strategy()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Five Korean-listed ETFs at 20% each, equity and bond sleeves.
    pub fn default_preset() -> Self {
        let assets = [
            ("102110.KS", "TIGER 200 (KOSPI200)"),
            ("283580.KS", "KODEX ChinaCSI300"),
            ("453810.KS", "KODEX IndiaNifty50"),
            ("148070.KS", "KIWOOM KTB 10Y"),
            ("385560.KS", "RISE KTB 30Y Enhanced"),
        ]
        .into_iter()
        .map(|(symbol, name)| Asset::new(symbol, 0.20).with_name(name))
        .collect();

        Self {
            strategy: StrategyConfig::default(),
            assets,
            data: DataConfig::default(),
            schedule: ScheduleConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn to_strategy(&self) -> Result<Strategy, CoreError> {
        Strategy::new(
            self.assets.clone(),
            self.strategy.to_windows()?,
            ScalarTable::new(self.strategy.scalars.clone())?,
            self.strategy.mode,
        )
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.symbol.as_str()).collect()
    }
}
