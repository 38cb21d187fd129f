//! TrendBand Runner: configuration, data loading, scheduling, and artifacts.
//!
//! This crate builds on `trendband-core` to provide:
//! - TOML run configuration with the five-ETF default preset
//! - Wide CSV price loading into an aligned `PriceSeries`
//! - Target-date resolution around weekends and non-trading days
//! - The daily run: truncate, evaluate, log, and wrap as a `ReportOutcome`
//! - JSON report and CSV state-history export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod schedule;

pub use config::{
    ConfigError, DataConfig, LoggingConfig, OutputConfig, RunConfig, ScheduleConfig,
    StrategyConfig,
};
pub use data_loader::{load_prices, parse_prices, CsvLayout, LoadError, LoadedPrices};
pub use export::{
    export_history_csv, export_json, import_json, load_report, save_artifacts, ArtifactPaths,
};
pub use runner::{run_daily_signal, run_history, run_outcome, run_single_signal, HistoryRun, RunError};
pub use schedule::{resolve_target_date, resolve_trading_date};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<CsvLayout>();
        assert_sync::<CsvLayout>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
