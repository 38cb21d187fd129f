//! Artifact export: JSON report and CSV state history.
//!
//! The report JSON carries a `schema_version`; newer versions are rejected
//! on load. The history CSV has one row per date and asset.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use trendband_core::report::SCHEMA_VERSION;
use trendband_core::SignalReport;

use crate::runner::HistoryRun;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SignalReport` to pretty JSON.
pub fn export_json(report: &SignalReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SignalReport to JSON")
}

/// Deserialize a `SignalReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SignalReport> {
    let report: SignalReport =
        serde_json::from_str(json).context("failed to deserialize SignalReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the replayed history as CSV.
///
/// Columns: date, symbol, score, scalar, weight, cash, then one
/// `state_<window>` column per window holding `ON` or `OFF`.
pub fn export_history_csv(run: &HistoryRun) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<String> = ["date", "symbol", "score", "scalar", "weight", "cash"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(
        run.history
            .windows()
            .iter()
            .map(|w| format!("state_{}", w.length)),
    );
    wtr.write_record(&header)?;

    for snap in &run.snapshots {
        let cash = format!("{:.6}", snap.cash);
        for alloc in &snap.assets {
            let mut record = vec![
                snap.date.to_string(),
                alloc.symbol.clone(),
                alloc.score.to_string(),
                format!("{:.4}", alloc.scalar),
                format!("{:.6}", alloc.weight),
                cash.clone(),
            ];
            record.extend(alloc.signals.iter().map(|s| s.state.to_string()));
            wtr.write_record(&record)?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Files written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub report: PathBuf,
    pub history: Option<PathBuf>,
}

/// Save the artifacts for one run under `output_dir`:
/// - `signal_<date>.json`: the full `SignalReport`
/// - `history_<date>.csv`: per-day states and weights, when `history` is given
///
/// Rerunning for the same date overwrites the previous files.
pub fn save_artifacts(
    report: &SignalReport,
    history: Option<&HistoryRun>,
    output_dir: &Path,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let date = report.target_date.format("%Y-%m-%d");
    let report_path = output_dir.join(format!("signal_{date}.json"));
    std::fs::write(&report_path, export_json(report)?)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    let history_path = match history {
        Some(run) => {
            let path = output_dir.join(format!("history_{date}.csv"));
            std::fs::write(&path, export_history_csv(run)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    Ok(ArtifactPaths {
        report: report_path,
        history: history_path,
    })
}

/// Load a `SignalReport` written by `save_artifacts`.
pub fn load_report(path: &Path) -> Result<SignalReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::runner::{run_daily_signal, run_history};
    use chrono::NaiveDate;
    use trendband_core::{Asset, PriceSeries};

    fn fixture() -> (RunConfig, PriceSeries) {
        let mut config = RunConfig::default_preset();
        config.assets = vec![Asset::new("AAA", 0.6).with_name("Alpha"), Asset::new("BBB", 0.4)];
        config.strategy.windows = vec![2, 4];
        config.strategy.scalars = vec![0.0, 0.5, 1.0];

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates = (0..6).map(|i| start + chrono::Duration::days(i)).collect();
        let series = PriceSeries::new(
            dates,
            vec![
                ("AAA".into(), vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0]),
                ("BBB".into(), vec![20.0, 19.0, 18.0, 17.0, 16.0, 15.0]),
            ],
        )
        .unwrap();
        (config, series)
    }

    #[test]
    fn json_import_matches_export() {
        let (config, series) = fixture();
        let report = run_daily_signal(&config, &series, series.last_date().unwrap()).unwrap();
        let json = export_json(&report).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        let back = import_json(&json).unwrap();
        assert_eq!(back.target_date, report.target_date);
        assert_eq!(back.fingerprint, report.fingerprint);
        assert_eq!(back.rebalance_needed, report.rebalance_needed);
        assert_eq!(back.asset("AAA").unwrap().name, "Alpha");
        assert_eq!(back.asset("AAA").unwrap().score, report.asset("AAA").unwrap().score);
    }

    #[test]
    fn future_schema_is_rejected() {
        let (config, series) = fixture();
        let mut report = run_daily_signal(&config, &series, series.last_date().unwrap()).unwrap();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn history_csv_has_row_per_date_and_asset() {
        let (config, series) = fixture();
        let run = run_history(&config, &series, None).unwrap();
        let csv = export_history_csv(&run).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,symbol,score,scalar,weight,cash,state_2,state_4");
        assert_eq!(lines.len(), 1 + 6 * 2);
        assert!(lines[1].starts_with("2024-03-01,AAA,0,"));
        assert!(lines[1].ends_with(",OFF,OFF"));
    }
}
