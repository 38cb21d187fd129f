//! Score → allocation scalar → per-asset weight, with the residual in cash.

use crate::domain::{Asset, SignalState, Window};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tolerance on the base-weight sum and the weights-plus-cash identity.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Scores are `u8`, so a table covers at most scores 0..=255.
pub const MAX_SCALAR_ENTRIES: usize = u8::MAX as usize + 1;

/// Allocation multiplier per score, indexed by score.
///
/// `values[s]` is the scalar for score `s`. Non-decreasing and within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ScalarTable {
    values: Vec<f64>,
}

impl ScalarTable {
    pub fn new(values: Vec<f64>) -> Result<Self, CoreError> {
        if values.is_empty() {
            return Err(CoreError::invalid_config("scalar table is empty"));
        }
        if values.len() > MAX_SCALAR_ENTRIES {
            return Err(CoreError::invalid_config(format!(
                "scalar table has {} entries, at most {MAX_SCALAR_ENTRIES} scores are supported",
                values.len()
            )));
        }
        if let Some((score, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(CoreError::invalid_config(format!(
                "scalar for score {score} is {v}, expected a fraction in [0, 1]"
            )));
        }
        if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(CoreError::invalid_config(format!(
                "scalar table must be non-decreasing: score {} maps to {} but score {} maps to {}",
                i,
                values[i],
                i + 1,
                values[i + 1]
            )));
        }
        Ok(Self { values })
    }

    /// {0: 0.0, 1: 0.5, 2: 0.75, 3: 1.0}
    pub fn default_three_window() -> Self {
        Self {
            values: vec![0.0, 0.5, 0.75, 1.0],
        }
    }

    /// Highest score the table covers.
    pub fn max_score(&self) -> u8 {
        u8::try_from(self.values.len() - 1).unwrap_or(u8::MAX)
    }

    pub fn get(&self, score: u8) -> Result<f64, CoreError> {
        self.values.get(score as usize).copied().ok_or_else(|| {
            CoreError::invalid_config(format!(
                "score {score} outside scalar table domain 0..={}",
                self.max_score()
            ))
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for ScalarTable {
    type Error = CoreError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ScalarTable> for Vec<f64> {
    fn from(table: ScalarTable) -> Self {
        table.values
    }
}

/// Check base weights: finite, non-negative, summing to at most 1.
pub fn validate_base_weights(assets: &[Asset]) -> Result<(), CoreError> {
    for asset in assets {
        if !asset.base_weight.is_finite() || asset.base_weight < 0.0 {
            return Err(CoreError::invalid_config(format!(
                "base weight for '{}' is {}, expected a non-negative fraction",
                asset.symbol, asset.base_weight
            )));
        }
    }
    let total: f64 = assets.iter().map(|a| a.base_weight).sum();
    if total > 1.0 + WEIGHT_TOLERANCE {
        return Err(CoreError::invalid_config(format!(
            "base weights sum to {total}, more than 1"
        )));
    }
    Ok(())
}

/// State of one window for one asset on the snapshot date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSignal {
    pub window: usize,
    pub state: SignalState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub symbol: String,
    pub score: u8,
    pub scalar: f64,
    pub weight: f64,
    pub signals: Vec<WindowSignal>,
}

/// Weights for one date. Asset weights plus cash sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    pub date: NaiveDate,
    pub assets: Vec<AssetAllocation>,
    pub cash: f64,
}

impl AllocationSnapshot {
    pub fn asset(&self, symbol: &str) -> Option<&AssetAllocation> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn invested(&self) -> f64 {
        self.assets.iter().map(|a| a.weight).sum()
    }
}

/// Maps scores to weights against fixed base weights.
#[derive(Debug, Clone)]
pub struct AllocationMapper {
    table: ScalarTable,
    assets: Vec<Asset>,
}

impl AllocationMapper {
    pub fn new(table: ScalarTable, assets: Vec<Asset>) -> Result<Self, CoreError> {
        validate_base_weights(&assets)?;
        Ok(Self { table, assets })
    }

    /// Per-asset weights and the cash residual for one day's scores.
    ///
    /// `scores` is in asset order.
    pub fn weights(&self, scores: &[u8]) -> Result<(Vec<f64>, f64), CoreError> {
        if scores.len() != self.assets.len() {
            return Err(CoreError::invalid_config(format!(
                "{} scores for {} assets",
                scores.len(),
                self.assets.len()
            )));
        }
        let weights = self
            .assets
            .iter()
            .zip(scores)
            .map(|(asset, &score)| Ok(self.table.get(score)? * asset.base_weight))
            .collect::<Result<Vec<f64>, CoreError>>()?;
        let cash = 1.0 - weights.iter().sum::<f64>();
        Ok((weights, cash))
    }

    /// Build the snapshot for one date from the per-asset window states.
    ///
    /// `states[asset][window]` follows asset order and `windows` order.
    pub fn snapshot(
        &self,
        date: NaiveDate,
        windows: &[Window],
        states: &[Vec<SignalState>],
    ) -> Result<AllocationSnapshot, CoreError> {
        let scores: Vec<u8> = states
            .iter()
            .map(|per_window| per_window.iter().filter(|s| s.is_on()).count() as u8)
            .collect();
        let (weights, cash) = self.weights(&scores)?;

        let assets = self
            .assets
            .iter()
            .zip(states)
            .zip(scores.iter().zip(weights))
            .map(|((asset, per_window), (&score, weight))| {
                Ok(AssetAllocation {
                    symbol: asset.symbol.clone(),
                    score,
                    scalar: self.table.get(score)?,
                    weight,
                    signals: windows
                        .iter()
                        .zip(per_window)
                        .map(|(w, &state)| WindowSignal {
                            window: w.length,
                            state,
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(AllocationSnapshot { date, assets, cash })
    }
}
