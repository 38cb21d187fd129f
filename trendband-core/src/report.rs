//! Structured report data for the presentation and delivery layer.
//!
//! Everything here is plain data: fractions stay fractions (0.20 for 20%),
//! and rounding, symbols, and language belong to whoever renders it.

use crate::allocation::AllocationSnapshot;
use crate::domain::{PriceSeries, SignalState, Strategy};
use crate::engine::{Diagnostic, SignalHistory, SignalMode};
use crate::error::CoreError;
use crate::fingerprint::RunFingerprint;
use crate::rebalance::{Direction, RebalanceSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub window: usize,
    pub state: SignalState,
    /// `None` during warm-up.
    pub moving_average: Option<f64>,
    /// `close / ma - 1`; 0 for a degenerate average, `None` during warm-up.
    pub disparity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReport {
    pub symbol: String,
    pub name: String,
    pub base_weight: f64,
    /// `None` until the asset's first print.
    pub close: Option<f64>,
    pub score: u8,
    pub scalar: f64,
    pub today_weight: f64,
    pub yesterday_weight: Option<f64>,
    pub weight_delta: f64,
    pub direction: Direction,
    pub windows: Vec<WindowReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub schema_version: u32,
    pub target_date: NaiveDate,
    pub previous_date: Option<NaiveDate>,
    pub mode: SignalMode,
    pub assets: Vec<AssetReport>,
    pub cash_today: f64,
    pub cash_yesterday: Option<f64>,
    pub rebalance_needed: bool,
    /// Yesterday's weights applied to the last day's asset returns.
    ///
    /// This is what the held portfolio earned into the target date. It is
    /// not today's recommended weights applied to that move, so it differs
    /// from that figure on any day an asset enters or exits.
    pub previous_day_return: Option<f64>,
    /// Trading days replayed to reach the target date.
    pub history_days: usize,
    pub fingerprint: RunFingerprint,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl SignalReport {
    pub fn asset(&self, symbol: &str) -> Option<&AssetReport> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    /// Assets by today's weight, largest first; ties keep configured order.
    pub fn by_weight(&self) -> Vec<&AssetReport> {
        let mut sorted: Vec<&AssetReport> = self.assets.iter().collect();
        sorted.sort_by(|a, b| {
            b.today_weight
                .partial_cmp(&a.today_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    pub fn invested_today(&self) -> f64 {
        self.assets.iter().map(|a| a.today_weight).sum()
    }
}

/// What the caller hands to the delivery layer.
///
/// `Unavailable` means no recommendation could be made; a recommendation
/// with `rebalance_needed == false` means "no change".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Recommendation(Box<SignalReport>),
    Unavailable {
        target_date: Option<NaiveDate>,
        reason: String,
    },
}

impl ReportOutcome {
    pub fn from_result<E: std::fmt::Display>(
        target_date: Option<NaiveDate>,
        result: Result<SignalReport, E>,
    ) -> Self {
        match result {
            Ok(report) => ReportOutcome::Recommendation(Box::new(report)),
            Err(e) => ReportOutcome::Unavailable {
                target_date,
                reason: e.to_string(),
            },
        }
    }

    pub fn is_recommendation(&self) -> bool {
        matches!(self, ReportOutcome::Recommendation(_))
    }

    /// `None` when no recommendation is available.
    pub fn rebalance_needed(&self) -> Option<bool> {
        match self {
            ReportOutcome::Recommendation(r) => Some(r.rebalance_needed),
            ReportOutcome::Unavailable { .. } => None,
        }
    }
}

/// Turns the replay, snapshots, and rebalance summary into a `SignalReport`.
pub struct ReportAssembler<'a> {
    strategy: &'a Strategy,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(strategy: &'a Strategy) -> Self {
        Self { strategy }
    }

    /// `series` must be the prepared series `history` was replayed from.
    pub fn assemble(
        &self,
        series: &PriceSeries,
        history: &SignalHistory,
        today: &AllocationSnapshot,
        yesterday: Option<&AllocationSnapshot>,
        rebalance: &RebalanceSummary,
    ) -> Result<SignalReport, CoreError> {
        let t = history
            .len()
            .checked_sub(1)
            .ok_or(CoreError::InsufficientHistory {
                required: self.strategy.max_window(),
                available: 0,
            })?;

        let assets = self
            .strategy
            .assets()
            .iter()
            .enumerate()
            .map(|(a, asset)| {
                let close = series.column(a)[t];
                let allocation = today.asset(&asset.symbol).ok_or_else(|| {
                    CoreError::misaligned(format!("no allocation for '{}'", asset.symbol))
                })?;
                let delta = rebalance.delta(&asset.symbol);
                let windows = (0..history.windows().len())
                    .map(|w| {
                        let point = history.band(a, w).point(t);
                        WindowReport {
                            window: history.windows()[w].length,
                            state: history.state(t, a, w),
                            moving_average: point.map(|p| p.ma),
                            disparity: point.map(|p| p.disparity(close)),
                        }
                    })
                    .collect();
                Ok(AssetReport {
                    symbol: asset.symbol.clone(),
                    name: asset.display_name().to_string(),
                    base_weight: asset.base_weight,
                    close: (!close.is_nan()).then_some(close),
                    score: allocation.score,
                    scalar: allocation.scalar,
                    today_weight: allocation.weight,
                    yesterday_weight: delta.and_then(|d| d.previous_weight),
                    weight_delta: delta.map_or(0.0, |d| d.delta),
                    direction: delta.map_or(Direction::Unchanged, |d| d.direction),
                    windows,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(SignalReport {
            schema_version: SCHEMA_VERSION,
            target_date: today.date,
            previous_date: yesterday.map(|y| y.date),
            mode: history.mode(),
            assets,
            cash_today: today.cash,
            cash_yesterday: yesterday.map(|y| y.cash),
            rebalance_needed: rebalance.needed,
            previous_day_return: yesterday.map(|y| previous_day_return(series, y, t)),
            history_days: history.len(),
            fingerprint: RunFingerprint::compute(self.strategy, series),
            diagnostics: history.diagnostics_on(today.date).cloned().collect(),
        })
    }
}

/// Σ yesterday weight × (close[t] / close[t-1] - 1), skipping undefined returns.
fn previous_day_return(series: &PriceSeries, yesterday: &AllocationSnapshot, t: usize) -> f64 {
    yesterday
        .assets
        .iter()
        .filter_map(|alloc| {
            let closes = series.closes(&alloc.symbol)?;
            let (prev, now) = (closes[t - 1], closes[t]);
            let ret = now / prev - 1.0;
            ret.is_finite().then_some(alloc.weight * ret)
        })
        .sum()
}
