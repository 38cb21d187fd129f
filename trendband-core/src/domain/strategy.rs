//! Immutable, validated strategy parameters.
//!
//! Built once before a run and passed by reference into every stage.

use crate::allocation::{validate_base_weights, ScalarTable};
use crate::domain::{Asset, Window};
use crate::engine::hysteresis::SignalMode;
use crate::error::CoreError;
use serde::Serialize;

/// Default moving-average lookbacks (short, medium, long).
pub const DEFAULT_WINDOWS: [usize; 3] = [20, 120, 200];

/// Default band width around each moving average.
pub const DEFAULT_BAND: f64 = 0.03;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    assets: Vec<Asset>,
    windows: Vec<Window>,
    scalars: ScalarTable,
    mode: SignalMode,
}

impl Strategy {
    /// Validate and build.
    ///
    /// Windows must be positive and strictly ascending, bands within [0, 1),
    /// the scalar table must cover every score from 0 to the window count,
    /// and base weights must be non-negative and sum to at most 1.
    pub fn new(
        assets: Vec<Asset>,
        windows: Vec<Window>,
        scalars: ScalarTable,
        mode: SignalMode,
    ) -> Result<Self, CoreError> {
        if assets.is_empty() {
            return Err(CoreError::invalid_config("no assets configured"));
        }
        for (i, asset) in assets.iter().enumerate() {
            if asset.symbol.trim().is_empty() {
                return Err(CoreError::invalid_config(format!("asset #{i} has an empty symbol")));
            }
            if assets[..i].iter().any(|a| a.symbol == asset.symbol) {
                return Err(CoreError::invalid_config(format!(
                    "asset '{}' listed twice",
                    asset.symbol
                )));
            }
        }
        validate_base_weights(&assets)?;

        if windows.is_empty() {
            return Err(CoreError::invalid_config("no moving-average windows configured"));
        }
        for w in &windows {
            if w.length == 0 {
                return Err(CoreError::invalid_config("window length must be positive"));
            }
            if !w.band.is_finite() || w.band < 0.0 || w.band >= 1.0 {
                return Err(CoreError::invalid_config(format!(
                    "band width {} for window {} must be a fraction in [0, 1)",
                    w.band, w.length
                )));
            }
        }
        if let Some(pair) = windows.windows(2).find(|p| p[1].length <= p[0].length) {
            return Err(CoreError::invalid_config(format!(
                "windows must be strictly ascending without duplicates: {} then {}",
                pair[0].length, pair[1].length
            )));
        }
        if windows.len() > u8::MAX as usize - 1 {
            return Err(CoreError::invalid_config("too many windows"));
        }

        if scalars.values().len() != windows.len() + 1 {
            return Err(CoreError::invalid_config(format!(
                "scalar table has {} entries, {} windows need {} (scores 0..={})",
                scalars.values().len(),
                windows.len(),
                windows.len() + 1,
                windows.len()
            )));
        }

        Ok(Self {
            assets,
            windows,
            scalars,
            mode,
        })
    }

    /// 20/120/200-day windows, 3% band, {0.0, 0.5, 0.75, 1.0}, hysteresis.
    pub fn with_defaults(assets: Vec<Asset>) -> Result<Self, CoreError> {
        Self::new(
            assets,
            DEFAULT_WINDOWS
                .iter()
                .map(|&len| Window::new(len, DEFAULT_BAND))
                .collect(),
            ScalarTable::default_three_window(),
            SignalMode::Hysteresis,
        )
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn scalars(&self) -> &ScalarTable {
        &self.scalars
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.symbol.as_str()).collect()
    }

    /// Longest lookback; the minimum series length for a run.
    pub fn max_window(&self) -> usize {
        self.windows.iter().map(|w| w.length).max().unwrap_or(0)
    }
}
