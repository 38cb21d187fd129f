//! Per-(asset, window) trend state machine and the full-history replay.
//!
//! Each pair is a two-state automaton driven by where the day's close sits
//! against that window's band:
//!
//! | prior | below lower | between | above upper |
//! |-------|-------------|---------|-------------|
//! | ON    | OFF         | ON      | ON          |
//! | OFF   | OFF         | OFF     | ON          |
//!
//! An undefined or non-positive moving average forces OFF. State on day t
//! depends on state on day t-1, so the history is replayed from the first
//! date, in order, every run.

use crate::domain::{PriceSeries, SignalState, Window};
use crate::indicators::{BandPoint, BandPosition, MaBand};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the ON/OFF state is derived from the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    /// Enter strictly above the upper band, exit strictly below the lower band.
    #[default]
    Hysteresis,
    /// Memoryless: ON exactly when the close is strictly above the upper band.
    Breakout,
}

impl SignalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalMode::Hysteresis => "hysteresis",
            SignalMode::Breakout => "breakout",
        }
    }
}

/// One day's input to a single automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayInput {
    /// Warm-up, or a missing close.
    Undefined,
    /// Moving average is zero or negative.
    Degenerate,
    Band(BandPosition),
}

impl DayInput {
    pub fn observe(close: f64, band: Option<BandPoint>) -> Self {
        match band {
            None => DayInput::Undefined,
            Some(_) if close.is_nan() => DayInput::Undefined,
            Some(p) if p.is_degenerate() => DayInput::Degenerate,
            Some(p) => DayInput::Band(p.classify(close)),
        }
    }
}

/// Next state from the prior state and the day's input.
pub fn transition(mode: SignalMode, prior: SignalState, input: DayInput) -> SignalState {
    let position = match input {
        DayInput::Undefined | DayInput::Degenerate => return SignalState::Off,
        DayInput::Band(position) => position,
    };
    match (mode, prior, position) {
        (_, _, BandPosition::AboveUpper) => SignalState::On,
        (SignalMode::Hysteresis, SignalState::On, BandPosition::Between) => SignalState::On,
        _ => SignalState::Off,
    }
}

/// States of every (asset, window) pair on one day, `[asset][window]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStates {
    rows: Vec<Vec<SignalState>>,
}

impl DayStates {
    /// The state before any data.
    pub fn all_off(assets: usize, windows: usize) -> Self {
        Self {
            rows: vec![vec![SignalState::Off; windows]; assets],
        }
    }

    pub fn rows(&self) -> &[Vec<SignalState>] {
        &self.rows
    }

    pub fn get(&self, asset: usize, window: usize) -> SignalState {
        self.rows[asset][window]
    }

    /// Number of ON windows for an asset.
    pub fn score(&self, asset: usize) -> u8 {
        self.rows[asset].iter().filter(|s| s.is_on()).count() as u8
    }

    pub fn scores(&self) -> Vec<u8> {
        (0..self.rows.len()).map(|a| self.score(a)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NonPositiveMovingAverage,
}

/// A non-fatal anomaly met during replay. The affected state was forced OFF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub date: NaiveDate,
    pub symbol: String,
    pub window: usize,
    pub kind: DiagnosticKind,
    pub moving_average: f64,
}

/// Full replayed history: bands, per-day states, and diagnostics.
#[derive(Debug, Clone)]
pub struct SignalHistory {
    mode: SignalMode,
    dates: Vec<NaiveDate>,
    windows: Vec<Window>,
    /// `[asset][window]`
    bands: Vec<Vec<MaBand>>,
    days: Vec<DayStates>,
    diagnostics: Vec<Diagnostic>,
}

impl SignalHistory {
    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn day(&self, t: usize) -> &DayStates {
        &self.days[t]
    }

    pub fn days(&self) -> &[DayStates] {
        &self.days
    }

    pub fn state(&self, t: usize, asset: usize, window: usize) -> SignalState {
        self.days[t].get(asset, window)
    }

    pub fn score(&self, t: usize, asset: usize) -> u8 {
        self.days[t].score(asset)
    }

    pub fn band(&self, asset: usize, window: usize) -> &MaBand {
        &self.bands[asset][window]
    }

    /// State series of one (asset, window) pair over every date.
    pub fn state_series(&self, asset: usize, window: usize) -> Vec<SignalState> {
        self.days.iter().map(|d| d.get(asset, window)).collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_on(&self, date: NaiveDate) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.date == date)
    }
}

/// Replays a price series through one automaton per (asset, window).
#[derive(Debug, Clone, Copy, Default)]
pub struct HysteresisEngine {
    mode: SignalMode,
}

impl HysteresisEngine {
    pub fn new(mode: SignalMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    /// One day forward. `inputs` is `[asset][window]`, shaped like `prior`.
    pub fn step(&self, prior: &DayStates, inputs: &[Vec<DayInput>]) -> DayStates {
        DayStates {
            rows: prior
                .rows
                .iter()
                .zip(inputs)
                .map(|(states, day)| {
                    states
                        .iter()
                        .zip(day)
                        .map(|(&state, &input)| transition(self.mode, state, input))
                        .collect()
                })
                .collect(),
        }
    }

    /// Replay every date of `series` in order, starting from all OFF.
    pub fn replay(&self, series: &PriceSeries, windows: &[Window]) -> SignalHistory {
        let n_assets = series.symbols().len();
        let bands: Vec<Vec<MaBand>> = (0..n_assets)
            .map(|a| {
                windows
                    .iter()
                    .map(|&w| MaBand::compute(series.column(a), w))
                    .collect()
            })
            .collect();

        let inputs_on = |t: usize| -> Vec<Vec<DayInput>> {
            bands
                .iter()
                .enumerate()
                .map(|(a, per_window)| {
                    let close = series.column(a)[t];
                    per_window
                        .iter()
                        .map(|band| DayInput::observe(close, band.point(t)))
                        .collect()
                })
                .collect()
        };

        let days: Vec<DayStates> = (0..series.len())
            .scan(DayStates::all_off(n_assets, windows.len()), |prior, t| {
                let next = self.step(prior, &inputs_on(t));
                *prior = next.clone();
                Some(next)
            })
            .collect();

        let diagnostics = collect_diagnostics(series, windows, &bands);

        SignalHistory {
            mode: self.mode,
            dates: series.dates().to_vec(),
            windows: windows.to_vec(),
            bands,
            days,
            diagnostics,
        }
    }
}

fn collect_diagnostics(
    series: &PriceSeries,
    windows: &[Window],
    bands: &[Vec<MaBand>],
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (t, date) in series.dates().iter().enumerate() {
        for (a, per_window) in bands.iter().enumerate() {
            for (w, band) in per_window.iter().enumerate() {
                if let Some(p) = band.point(t).filter(|p| p.is_degenerate()) {
                    out.push(Diagnostic {
                        date: *date,
                        symbol: series.symbols()[a].clone(),
                        window: windows[w].length,
                        kind: DiagnosticKind::NonPositiveMovingAverage,
                        moving_average: p.ma,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: SignalState = SignalState::On;
    const OFF: SignalState = SignalState::Off;

    fn band_3pct() -> BandPoint {
        BandPoint::from_ma(100.0, 0.03)
    }

    fn step(prior: SignalState, close: f64) -> SignalState {
        transition(
            SignalMode::Hysteresis,
            prior,
            DayInput::observe(close, Some(band_3pct())),
        )
    }

    #[test]
    fn off_touching_upper_stays_off() {
        let p = band_3pct();
        assert_eq!(step(OFF, p.upper), OFF);
        assert_eq!(step(OFF, p.upper * 1.001), ON);
    }

    #[test]
    fn on_touching_lower_stays_on() {
        let p = band_3pct();
        assert_eq!(step(ON, p.lower), ON);
        assert_eq!(step(ON, p.lower * 0.999), OFF);
    }

    #[test]
    fn on_holds_between_bands() {
        assert_eq!(step(ON, 99.0), ON);
        assert_eq!(step(ON, 102.9), ON);
        assert_eq!(step(ON, 110.0), ON);
    }

    #[test]
    fn off_holds_between_bands() {
        assert_eq!(step(OFF, 99.0), OFF);
        assert_eq!(step(OFF, 101.0), OFF);
        assert_eq!(step(OFF, 90.0), OFF);
    }

    #[test]
    fn undefined_average_forces_off() {
        for mode in [SignalMode::Hysteresis, SignalMode::Breakout] {
            assert_eq!(transition(mode, ON, DayInput::Undefined), OFF);
            assert_eq!(transition(mode, ON, DayInput::Degenerate), OFF);
        }
        assert_eq!(DayInput::observe(f64::NAN, Some(band_3pct())), DayInput::Undefined);
        assert_eq!(DayInput::observe(100.0, None), DayInput::Undefined);
        assert_eq!(
            DayInput::observe(1.0, Some(BandPoint::from_ma(0.0, 0.03))),
            DayInput::Degenerate
        );
    }

    #[test]
    fn breakout_mode_drops_memory() {
        let between = DayInput::Band(BandPosition::Between);
        assert_eq!(transition(SignalMode::Breakout, ON, between), OFF);
        assert_eq!(
            transition(SignalMode::Breakout, OFF, DayInput::Band(BandPosition::AboveUpper)),
            ON
        );
    }

    #[test]
    fn step_maps_every_pair() {
        let engine = HysteresisEngine::new(SignalMode::Hysteresis);
        let prior = DayStates {
            rows: vec![vec![ON, OFF], vec![OFF, ON]],
        };
        let inputs = vec![
            vec![
                DayInput::Band(BandPosition::Between),
                DayInput::Band(BandPosition::AboveUpper),
            ],
            vec![DayInput::Undefined, DayInput::Band(BandPosition::BelowLower)],
        ];
        let next = engine.step(&prior, &inputs);
        assert_eq!(next.rows(), &[vec![ON, ON], vec![OFF, OFF]]);
        assert_eq!(next.scores(), vec![2, 0]);
    }

    #[test]
    fn all_off_has_zero_scores() {
        let d = DayStates::all_off(5, 3);
        assert_eq!(d.scores(), vec![0; 5]);
    }
}
