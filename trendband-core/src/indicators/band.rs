//! Moving-average band: SMA with a fractional envelope.
//!
//! - Middle: SMA(close, length)
//! - Upper: middle * (1 + band)
//! - Lower: middle * (1 - band)
//!
//! Lookback: length - 1. Undefined wherever the SMA is undefined.

use super::{Indicator, Sma};
use crate::domain::Window;

/// Where a close sits relative to the band on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    /// `close < lower`
    BelowLower,
    /// `lower <= close <= upper`
    Between,
    /// `close > upper`
    AboveUpper,
}

/// The band on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub ma: f64,
    pub upper: f64,
    pub lower: f64,
}

impl BandPoint {
    pub fn from_ma(ma: f64, band: f64) -> Self {
        Self {
            ma,
            upper: ma * (1.0 + band),
            lower: ma * (1.0 - band),
        }
    }

    pub fn classify(&self, close: f64) -> BandPosition {
        if close > self.upper {
            BandPosition::AboveUpper
        } else if close < self.lower {
            BandPosition::BelowLower
        } else {
            BandPosition::Between
        }
    }

    /// A non-positive average carries no trend information.
    pub fn is_degenerate(&self) -> bool {
        self.ma <= 0.0
    }

    /// `close / ma - 1`, or 0 when the average is degenerate.
    pub fn disparity(&self, close: f64) -> f64 {
        if self.is_degenerate() || close.is_nan() {
            0.0
        } else {
            close / self.ma - 1.0
        }
    }
}

/// Precomputed band series for one asset and one window.
#[derive(Debug, Clone)]
pub struct MaBand {
    window: Window,
    ma: Vec<f64>,
}

impl MaBand {
    pub fn compute(closes: &[f64], window: Window) -> Self {
        Self {
            window,
            ma: Sma::new(window.length).compute(closes),
        }
    }

    /// Band on day `t`, or `None` while the average is undefined.
    pub fn point(&self, t: usize) -> Option<BandPoint> {
        self.ma
            .get(t)
            .copied()
            .filter(|ma| !ma.is_nan())
            .map(|ma| BandPoint::from_ma(ma, self.window.band))
    }
}
