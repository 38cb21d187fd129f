//! Moving-average indicators.
//!
//! Indicators are pure functions: a close series in, a numeric series of the
//! same length out. Values that cannot be computed yet (warm-up) or whose
//! window contains a missing print are `f64::NAN`.
//!
//! No value at index t may depend on a close after t.

pub mod band;
pub mod sma;

pub use band::{BandPoint, BandPosition, MaBand};
pub use sma::Sma;

pub trait Indicator: Send + Sync {
    /// Compute over the full close series. Output has the same length.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
