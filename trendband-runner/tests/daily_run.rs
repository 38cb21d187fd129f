//! End-to-end daily runs from files on disk: config TOML + wide price CSV
//! in, report JSON and history CSV out.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt::Write as _;
use std::path::Path;
use trendband_runner::{
    load_prices, load_report, resolve_target_date, run_history, run_outcome, run_single_signal,
    save_artifacts, RunConfig, RunError,
};

const DAYS: usize = 260;

fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = start;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

/// Two symbols rising 1% a day, one flat, two falling 1% a day.
/// The last symbol misses one print mid-history.
fn write_prices(path: &Path, symbols: &[&str]) -> Vec<NaiveDate> {
    let dates = business_days(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), DAYS);
    let drift: [f64; 5] = [1.01, 1.01, 1.0, 0.99, 0.99];
    let mut csv = String::from("date");
    for s in symbols {
        write!(csv, ",{s}").unwrap();
    }
    csv.push('\n');
    for (t, date) in dates.iter().enumerate() {
        write!(csv, "{date}").unwrap();
        for (i, rate) in drift.iter().enumerate().take(symbols.len()) {
            if i == 4 && t == 150 {
                csv.push(',');
            } else {
                write!(csv, ",{:.6}", 100.0 * rate.powi(t as i32)).unwrap();
            }
        }
        csv.push('\n');
    }
    std::fs::write(path, csv).unwrap();
    dates
}

fn setup(dir: &Path) -> (RunConfig, Vec<NaiveDate>) {
    let mut config = RunConfig::default_preset();
    config.data.prices = dir.join("prices.csv");
    config.output.dir = dir.join("signals");
    let dates = write_prices(&config.data.prices, &config.symbols());
    std::fs::write(dir.join("trendband.toml"), config.to_toml().unwrap()).unwrap();
    (config, dates)
}

#[test]
fn monday_run_reports_friday_close() {
    let tmp = tempfile::tempdir().unwrap();
    let (_, dates) = setup(tmp.path());
    let config = RunConfig::from_file(&tmp.path().join("trendband.toml")).unwrap();

    let last = *dates.last().unwrap();
    assert_eq!(last.weekday(), Weekday::Fri);
    let monday = last + Duration::days(3);
    let target = resolve_target_date(monday, config.schedule.test_mode).unwrap();
    assert_eq!(target, last);

    let report = run_single_signal(&config, target).unwrap();
    assert_eq!(report.target_date, last);
    assert_eq!(report.history_days, DAYS);

    let risers = ["102110.KS", "283580.KS"];
    for asset in &report.assets {
        if risers.contains(&asset.symbol.as_str()) {
            assert_eq!(asset.score, 3, "{}", asset.symbol);
            assert!((asset.today_weight - 0.2).abs() < 1e-12);
        } else {
            assert_eq!(asset.score, 0, "{}", asset.symbol);
            assert_eq!(asset.today_weight, 0.0);
        }
    }
    assert!((report.cash_today - 0.6).abs() < 1e-9);
    assert!((report.invested_today() + report.cash_today - 1.0).abs() < 1e-9);
    assert!(!report.rebalance_needed);
    assert_eq!(report.asset("102110.KS").unwrap().name, "TIGER 200 (KOSPI200)");

    let ret = report.previous_day_return.unwrap();
    assert!((ret - 0.4 * 0.01).abs() < 1e-6, "return {ret}");
}

#[test]
fn weekend_without_test_mode_has_no_target() {
    let saturday = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
    assert_eq!(resolve_target_date(saturday, false), None);
    assert_eq!(
        resolve_target_date(saturday, true),
        NaiveDate::from_ymd_opt(2023, 12, 29)
    );
}

#[test]
fn artifacts_round_trip_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, dates) = setup(tmp.path());
    let target = *dates.last().unwrap();

    let report = run_single_signal(&config, target).unwrap();
    let prices = load_prices(&config.data.prices, &config.data.layout()).unwrap();
    let history = run_history(&config, &prices.series, Some(target)).unwrap();

    let paths = save_artifacts(&report, Some(&history), &config.output.dir).unwrap();
    assert!(paths.report.ends_with("signal_2023-12-29.json"));
    let history_path = paths.history.unwrap();
    assert!(history_path.exists());

    let loaded = load_report(&paths.report).unwrap();
    assert_eq!(loaded.target_date, report.target_date);
    assert_eq!(loaded.fingerprint, report.fingerprint);
    assert_eq!(loaded.assets.len(), 5);

    let csv = std::fs::read_to_string(history_path).unwrap();
    assert_eq!(csv.lines().count(), 1 + DAYS * 5);
    assert!(csv.starts_with("date,symbol,score,scalar,weight,cash,state_20,state_120,state_200\n"));
}

#[test]
fn missing_print_is_forward_filled() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, _) = setup(tmp.path());
    let prices = load_prices(&config.data.prices, &config.data.layout()).unwrap();
    assert_eq!(prices.total_missing(), 1);
    assert_eq!(prices.missing[4], ("385560.KS".to_string(), 1));

    let history = run_history(&config, &prices.series, None).unwrap();
    assert_eq!(history.snapshots.len(), DAYS);
}

#[test]
fn history_before_target_is_truncated() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, dates) = setup(tmp.path());
    let prices = load_prices(&config.data.prices, &config.data.layout()).unwrap();

    let cut = dates[229];
    let run = run_history(&config, &prices.series, Some(cut)).unwrap();
    assert_eq!(run.snapshots.len(), 230);
    assert_eq!(run.snapshots.last().unwrap().date, cut);
}

#[test]
fn missing_symbol_yields_no_recommendation() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut config, dates) = setup(tmp.path());
    write_prices(&config.data.prices, &["102110.KS", "283580.KS", "453810.KS", "148070.KS"]);
    let prices = load_prices(&config.data.prices, &config.data.layout()).unwrap();

    let outcome = run_outcome(&config, &prices.series, *dates.last().unwrap());
    assert!(!outcome.is_recommendation());
    let json = serde_json::to_string(&outcome).unwrap();
    assert!(json.contains("385560.KS"), "{json}");

    config.assets.truncate(4);
    config.assets.iter_mut().for_each(|a| a.base_weight = 0.25);
    let outcome = run_outcome(&config, &prices.series, *dates.last().unwrap());
    assert!(outcome.is_recommendation());
}

#[test]
fn short_history_is_insufficient() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, dates) = setup(tmp.path());
    let err = run_single_signal(&config, dates[198]).unwrap_err();
    match err {
        RunError::Core(trendband_core::CoreError::InsufficientHistory { required, available }) => {
            assert_eq!((required, available), (200, 199));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_price_file_is_a_data_error() {
    let mut config = RunConfig::default_preset();
    config.data.prices = "/nonexistent/prices.csv".into();
    let target = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    assert!(matches!(
        run_single_signal(&config, target),
        Err(RunError::Data(_))
    ));
}
