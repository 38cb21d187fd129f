//! End-to-end evaluation: series → bands → replay → snapshots → report.

use crate::allocation::{AllocationMapper, AllocationSnapshot};
use crate::domain::{PriceSeries, Strategy};
use crate::engine::hysteresis::{HysteresisEngine, SignalHistory};
use crate::error::CoreError;
use crate::rebalance::RebalanceDetector;
use crate::report::{ReportAssembler, SignalReport};

/// Select the strategy's assets, forward-fill, and check the length.
///
/// Runs before any replay so misaligned or short input never produces a
/// partial result.
pub fn prepare_series(strategy: &Strategy, series: &PriceSeries) -> Result<PriceSeries, CoreError> {
    let prepared = series.select(&strategy.symbols())?.forward_filled();
    let required = strategy.max_window();
    if prepared.len() < required {
        return Err(CoreError::InsufficientHistory {
            required,
            available: prepared.len(),
        });
    }
    Ok(prepared)
}

/// Replay the whole history.
pub fn replay(strategy: &Strategy, series: &PriceSeries) -> Result<SignalHistory, CoreError> {
    let prepared = prepare_series(strategy, series)?;
    Ok(HysteresisEngine::new(strategy.mode()).replay(&prepared, strategy.windows()))
}

/// Replay the whole history and map every day to an allocation snapshot.
///
/// `snapshots[t]` is the allocation implied by `history.day(t)`.
pub fn replay_with_snapshots(
    strategy: &Strategy,
    series: &PriceSeries,
) -> Result<(SignalHistory, Vec<AllocationSnapshot>), CoreError> {
    let history = replay(strategy, series)?;
    let mapper = AllocationMapper::new(strategy.scalars().clone(), strategy.assets().to_vec())?;
    let snapshots = history
        .dates()
        .iter()
        .zip(history.days())
        .map(|(&date, day)| mapper.snapshot(date, strategy.windows(), day.rows()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((history, snapshots))
}

/// One allocation snapshot per date of the replayed history.
pub fn snapshots(
    strategy: &Strategy,
    series: &PriceSeries,
) -> Result<Vec<AllocationSnapshot>, CoreError> {
    replay_with_snapshots(strategy, series).map(|(_, snapshots)| snapshots)
}

/// Evaluate the last date of `series` against the one before it.
pub fn evaluate(strategy: &Strategy, series: &PriceSeries) -> Result<SignalReport, CoreError> {
    let prepared = prepare_series(strategy, series)?;
    let history = HysteresisEngine::new(strategy.mode()).replay(&prepared, strategy.windows());
    let mapper = AllocationMapper::new(strategy.scalars().clone(), strategy.assets().to_vec())?;

    let t = history.len().checked_sub(1).ok_or(CoreError::InsufficientHistory {
        required: strategy.max_window().max(1),
        available: 0,
    })?;
    let snapshot_at =
        |i: usize| mapper.snapshot(history.dates()[i], strategy.windows(), history.day(i).rows());

    let today = snapshot_at(t)?;
    let yesterday = t.checked_sub(1).map(snapshot_at).transpose()?;
    let rebalance = RebalanceDetector::default().compare(yesterday.as_ref(), &today);

    ReportAssembler::new(strategy).assemble(&prepared, &history, &today, yesterday.as_ref(), &rebalance)
}
