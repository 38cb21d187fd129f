//! TrendBand CLI: daily signal, state history, and config scaffolding.
//!
//! Commands:
//! - `run`: evaluate the scheduled (or `--as-of`) date and write artifacts
//! - `history`: export the replayed per-day states and weights as CSV
//! - `init-config`: print the default five-ETF config as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use trendband_core::{Direction, ReportOutcome, SignalReport};
use trendband_runner::{
    export_history_csv, load_prices, resolve_target_date, run_history, run_outcome,
    save_artifacts, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "trendband",
    about = "TrendBand CLI: daily multi-window trend-band allocation signal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the signal for the scheduled date and save the report.
    Run {
        /// Path to a TOML config file. Defaults to the built-in preset.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price CSV, overriding `[data] prices`.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Evaluate this date (YYYY-MM-DD) instead of the scheduled one.
        #[arg(long)]
        as_of: Option<String>,

        /// Run on weekends against the last Friday.
        #[arg(long, default_value_t = false)]
        test_mode: bool,

        /// Output directory, overriding `[output] dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write the state-history CSV.
        #[arg(long, default_value_t = false)]
        history: bool,

        /// Print the outcome as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export per-day states, scores, and weights as CSV.
    History {
        /// Path to a TOML config file. Defaults to the built-in preset.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price CSV, overriding `[data] prices`.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Last date to include (YYYY-MM-DD). Defaults to the end of the data.
        #[arg(long)]
        until: Option<String>,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the default config as TOML.
    InitConfig {
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            prices,
            as_of,
            test_mode,
            output_dir,
            history,
            json,
        } => run_signal_cmd(
            config, prices, as_of, test_mode, output_dir, history, json,
        ),
        Commands::History {
            config,
            prices,
            until,
            out,
        } => run_history_cmd(config, prices, until, out),
        Commands::InitConfig { out } => run_init_config(out),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the config level.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, prices: Option<PathBuf>) -> Result<RunConfig> {
    let mut config = match path {
        Some(p) => RunConfig::from_file(p)?,
        None => RunConfig::default_preset(),
    };
    if let Some(prices) = prices {
        config.data.prices = prices;
    }
    Ok(config)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn run_signal_cmd(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    as_of: Option<String>,
    test_mode: bool,
    output_dir: Option<PathBuf>,
    history: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), prices)?;
    init_logging(&config.logging.level);

    let as_of = as_of.as_deref().map(parse_date).transpose()?;
    let today = chrono::Local::now().date_naive();
    let test_mode = test_mode || config.schedule.test_mode;
    let Some(target) = as_of.or_else(|| resolve_target_date(today, test_mode)) else {
        info!(today = %today, "weekend, no signal scheduled");
        println!("No signal scheduled for {today} (weekend).");
        return Ok(());
    };
    info!(target = %target, assets = config.assets.len(), "running daily signal");

    let (outcome, series) = match load_prices(&config.data.prices, &config.data.layout()) {
        Ok(loaded) => (run_outcome(&config, &loaded.series, target), Some(loaded.series)),
        Err(e) => {
            warn!(error = %e, "price data unavailable");
            let outcome = ReportOutcome::Unavailable {
                target_date: Some(target),
                reason: e.to_string(),
            };
            (outcome, None)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    let report = match outcome {
        ReportOutcome::Recommendation(report) => report,
        ReportOutcome::Unavailable { reason, .. } => {
            if !json {
                println!("No recommendation available for {target}: {reason}");
            }
            bail!("no recommendation available");
        }
    };

    let history_run = match (&series, history || config.output.write_history) {
        (Some(series), true) => Some(run_history(&config, series, Some(report.target_date))?),
        _ => None,
    };
    let dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
    let paths = save_artifacts(&report, history_run.as_ref(), &dir)?;
    info!(report = %paths.report.display(), "artifacts saved");

    if !json {
        print_summary(&report);
        println!();
        println!("Report saved to: {}", paths.report.display());
        if let Some(h) = &paths.history {
            println!("History saved to: {}", h.display());
        }
    }
    Ok(())
}

fn run_history_cmd(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    until: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), prices)?;
    init_logging(&config.logging.level);

    let until = until.as_deref().map(parse_date).transpose()?;
    let loaded = load_prices(&config.data.prices, &config.data.layout())?;
    let run = run_history(&config, &loaded.series, until)?;
    let csv = export_history_csv(&run)?;

    match out {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), rows = run.snapshots.len(), "history written");
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn run_init_config(out: Option<PathBuf>) -> Result<()> {
    let toml_str = RunConfig::default_preset().to_toml()?;
    match out {
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(&path, toml_str)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Config written to: {}", path.display());
        }
        None => print!("{toml_str}"),
    }
    Ok(())
}

fn print_summary(report: &SignalReport) {
    println!();
    println!("=== Daily Signal ===");
    println!("Date:           {}", report.target_date);
    if let Some(prev) = report.previous_date {
        println!("Compared with:  {prev}");
    }
    println!("Mode:           {}", report.mode.as_str());
    println!("History:        {} trading days", report.history_days);
    println!();
    println!("--- Allocation ---");
    for asset in report.by_weight() {
        let yesterday = asset
            .yesterday_weight
            .map_or_else(|| "-".to_string(), |w| format!("{:.1}%", w * 100.0));
        let arrow = match asset.direction {
            Direction::Increase => "▲",
            Direction::Decrease => "▼",
            Direction::Unchanged => "=",
        };
        let states: Vec<String> = asset
            .windows
            .iter()
            .map(|w| format!("{}:{}", w.window, w.state))
            .collect();
        println!(
            "{:<24} {:>6.1}% (was {:>6}) {arrow}  score {}  [{}]",
            asset.name,
            asset.today_weight * 100.0,
            yesterday,
            asset.score,
            states.join(" ")
        );
    }
    println!("{:<24} {:>6.1}%", "Cash", report.cash_today * 100.0);
    println!();
    if let Some(ret) = report.previous_day_return {
        println!("Previous day:   {:+.2}%", ret * 100.0);
    }
    if report.rebalance_needed {
        println!("Rebalance:      REQUIRED");
    } else {
        println!("Rebalance:      no change");
    }
    for d in &report.diagnostics {
        println!(
            "WARNING: {} {}-day average is {:.4}, window held OFF",
            d.symbol, d.window, d.moving_average
        );
    }
}
