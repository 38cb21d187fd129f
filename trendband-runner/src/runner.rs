//! Daily signal runner: wires together config, prices, and the core engine.
//!
//! Three entry points:
//! - `run_daily_signal()`: takes a loaded series, returns the report or an error.
//! - `run_outcome()`: same, but folds failures into `ReportOutcome::Unavailable`.
//! - `run_history()`: the full replay with one allocation snapshot per day.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use trendband_core::{
    evaluate, replay_with_snapshots, AllocationSnapshot, CoreError, PriceSeries, ReportOutcome,
    SignalHistory, SignalReport,
};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_prices, LoadError};
use crate::schedule::resolve_trading_date;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("no trading day on or before {0} in the price data")]
    NoTradingDay(NaiveDate),
}

/// Replayed states plus the allocation they imply on every day.
#[derive(Debug, Clone)]
pub struct HistoryRun {
    pub history: SignalHistory,
    pub snapshots: Vec<AllocationSnapshot>,
}

/// Load prices from `config.data` and run for `target`.
pub fn run_single_signal(config: &RunConfig, target: NaiveDate) -> Result<SignalReport, RunError> {
    let loaded = load_prices(&config.data.prices, &config.data.layout())?;
    for (symbol, missing) in loaded.missing.iter().filter(|(_, n)| *n > 0) {
        debug!(symbol = %symbol, missing, "missing closes will be forward-filled");
    }
    run_daily_signal(config, &loaded.series, target)
}

/// Evaluate the last trading day on or before `target`.
///
/// Data after the trading day is dropped before anything is computed.
pub fn run_daily_signal(
    config: &RunConfig,
    series: &PriceSeries,
    target: NaiveDate,
) -> Result<SignalReport, RunError> {
    let strategy = config.to_strategy()?;
    let trading_day = trading_day(series, target)?;
    let report = evaluate(&strategy, &series.truncate_to(trading_day))?;

    for d in &report.diagnostics {
        warn!(
            symbol = %d.symbol,
            window = d.window,
            moving_average = d.moving_average,
            "non-positive moving average, window forced OFF"
        );
    }
    info!(
        date = %report.target_date,
        days = report.history_days,
        cash = report.cash_today,
        rebalance = report.rebalance_needed,
        fingerprint = %report.fingerprint.short(),
        "signal evaluated"
    );
    Ok(report)
}

/// Like `run_daily_signal`, but any failure becomes "no recommendation".
pub fn run_outcome(config: &RunConfig, series: &PriceSeries, target: NaiveDate) -> ReportOutcome {
    let result = run_daily_signal(config, series, target);
    if let Err(e) = &result {
        warn!(target_date = %target, error = %e, "no recommendation available");
    }
    ReportOutcome::from_result(Some(target), result)
}

/// Replay up to `until` (or the whole series) and map every day to weights.
pub fn run_history(
    config: &RunConfig,
    series: &PriceSeries,
    until: Option<NaiveDate>,
) -> Result<HistoryRun, RunError> {
    let strategy = config.to_strategy()?;
    let series = match until {
        Some(target) => series.truncate_to(trading_day(series, target)?),
        None => series.clone(),
    };
    let (history, snapshots) = replay_with_snapshots(&strategy, &series)?;

    info!(
        days = history.len(),
        diagnostics = history.diagnostics().len(),
        "history replayed"
    );
    Ok(HistoryRun { history, snapshots })
}

fn trading_day(series: &PriceSeries, target: NaiveDate) -> Result<NaiveDate, RunError> {
    let day = resolve_trading_date(series, target).ok_or(RunError::NoTradingDay(target))?;
    if day != target {
        info!(target = %target, trading_day = %day, "target is not a trading day, using last close");
    }
    Ok(day)
}
