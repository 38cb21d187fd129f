//! TrendBand Core: multi-window moving-average trend signals and allocation.
//!
//! This crate contains the pure, deterministic heart of the daily signal:
//! - Domain types (assets, windows, signal states, price series, strategy)
//! - Moving-average band indicators
//! - Hysteresis state machine replayed over the full history
//! - Score → scalar → weight allocation with a cash residual
//! - Day-over-day rebalance detection
//! - Structured report data and run fingerprints
//!
//! No I/O, no clock, no environment access.

pub mod allocation;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod rebalance;
pub mod report;

pub use allocation::{AllocationMapper, AllocationSnapshot, AssetAllocation, ScalarTable};
pub use domain::{Asset, PriceSeries, SignalState, Strategy, Window};
pub use engine::{evaluate, replay, replay_with_snapshots, snapshots, SignalHistory, SignalMode};
pub use error::CoreError;
pub use fingerprint::RunFingerprint;
pub use rebalance::{Direction, RebalanceDetector, RebalanceSummary};
pub use report::{AssetReport, ReportOutcome, SignalReport, WindowReport};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public data types are Send + Sync so callers can
    /// move reports across threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<Strategy>();
        require_sync::<Strategy>();
        require_send::<SignalHistory>();
        require_sync::<SignalHistory>();
        require_send::<AllocationSnapshot>();
        require_sync::<AllocationSnapshot>();
        require_send::<SignalReport>();
        require_sync::<SignalReport>();
        require_send::<ReportOutcome>();
        require_sync::<ReportOutcome>();
        require_send::<CoreError>();
        require_sync::<CoreError>();
    }

    /// Architecture contract: the evaluation entry point takes only a strategy
    /// and a price series. No clock, no environment, no I/O handle.
    #[test]
    fn evaluate_takes_only_strategy_and_series() {
        fn _check(strategy: &Strategy, series: &PriceSeries) -> Result<SignalReport, CoreError> {
            evaluate(strategy, series)
        }
    }
}
