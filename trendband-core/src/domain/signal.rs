//! Moving-average windows and the binary trend state.

use serde::{Deserialize, Serialize};

/// A lookback length paired with its band width.
///
/// `band` is a fraction: 0.03 puts the upper band 3% above the moving
/// average and the lower band 3% below it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub length: usize,
    pub band: f64,
}

impl Window {
    pub fn new(length: usize, band: f64) -> Self {
        Self { length, band }
    }
}

/// Trend state of one (asset, window) pair on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    On,
    #[default]
    Off,
}

impl SignalState {
    pub fn is_on(self) -> bool {
        matches!(self, SignalState::On)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalState::On => "ON",
            SignalState::Off => "OFF",
        }
    }
}

impl std::fmt::Display for SignalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
