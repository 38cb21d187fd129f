//! Run fingerprinting: deterministic digests of the inputs to a run.
//!
//! Two runs with equal fingerprints saw bit-identical prices and parameters,
//! so their states, scores, and weights must match exactly.

use crate::domain::{PriceSeries, Strategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunFingerprint {
    /// BLAKE3 over dates and closes, in column order.
    pub dataset_hash: String,
    /// BLAKE3 over assets, weights, windows, scalar table, and mode.
    pub strategy_hash: String,
}

impl RunFingerprint {
    pub fn compute(strategy: &Strategy, series: &PriceSeries) -> Self {
        Self {
            dataset_hash: dataset_hash(series),
            strategy_hash: strategy_hash(strategy),
        }
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> String {
        format!(
            "{}/{}",
            &self.dataset_hash[..12.min(self.dataset_hash.len())],
            &self.strategy_hash[..12.min(self.strategy_hash.len())]
        )
    }
}

pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for date in series.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for (i, symbol) in series.symbols().iter().enumerate() {
        hasher.update(symbol.as_bytes());
        hasher.update(&[0]);
        for close in series.column(i) {
            hasher.update(&close.to_bits().to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

pub fn strategy_hash(strategy: &Strategy) -> String {
    let mut hasher = blake3::Hasher::new();
    for asset in strategy.assets() {
        hasher.update(asset.symbol.as_bytes());
        hasher.update(&[0]);
        hasher.update(&asset.base_weight.to_bits().to_le_bytes());
    }
    for window in strategy.windows() {
        hasher.update(&(window.length as u64).to_le_bytes());
        hasher.update(&window.band.to_bits().to_le_bytes());
    }
    for scalar in strategy.scalars().values() {
        hasher.update(&scalar.to_bits().to_le_bytes());
    }
    hasher.update(strategy.mode().as_str().as_bytes());
    hasher.finalize().to_hex().to_string()
}
