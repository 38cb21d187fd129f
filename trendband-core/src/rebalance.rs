//! Day-over-day change detection.

use crate::allocation::AllocationSnapshot;
use serde::{Deserialize, Serialize};

/// Weight changes smaller than this are reported as unchanged.
pub const DIRECTION_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
    Unchanged,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
            Direction::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDelta {
    pub symbol: String,
    pub previous_weight: Option<f64>,
    pub current_weight: f64,
    /// `current - previous`; 0 without a previous snapshot.
    pub delta: f64,
    pub direction: Direction,
    pub scalar_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceSummary {
    /// True iff at least one asset's allocation scalar changed.
    pub needed: bool,
    pub deltas: Vec<AssetDelta>,
}

impl RebalanceSummary {
    pub fn delta(&self, symbol: &str) -> Option<&AssetDelta> {
        self.deltas.iter().find(|d| d.symbol == symbol)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RebalanceDetector {
    epsilon: f64,
}

impl Default for RebalanceDetector {
    fn default() -> Self {
        Self::new(DIRECTION_EPSILON)
    }
}

impl RebalanceDetector {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn direction(&self, delta: f64) -> Direction {
        if delta > self.epsilon {
            Direction::Increase
        } else if delta < -self.epsilon {
            Direction::Decrease
        } else {
            Direction::Unchanged
        }
    }

    /// Compare today against yesterday. With no yesterday nothing changed.
    pub fn compare(
        &self,
        yesterday: Option<&AllocationSnapshot>,
        today: &AllocationSnapshot,
    ) -> RebalanceSummary {
        let deltas: Vec<AssetDelta> = today
            .assets
            .iter()
            .map(|now| {
                let before = yesterday.and_then(|y| y.asset(&now.symbol));
                let delta = before.map_or(0.0, |b| now.weight - b.weight);
                AssetDelta {
                    symbol: now.symbol.clone(),
                    previous_weight: before.map(|b| b.weight),
                    current_weight: now.weight,
                    delta,
                    direction: self.direction(delta),
                    scalar_changed: before.is_some_and(|b| b.scalar != now.scalar),
                }
            })
            .collect();

        RebalanceSummary {
            needed: deltas.iter().any(|d| d.scalar_changed),
            deltas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::AssetAllocation;
    use chrono::NaiveDate;

    fn snap(day: u32, scalars: &[f64]) -> AllocationSnapshot {
        let assets: Vec<AssetAllocation> = scalars
            .iter()
            .enumerate()
            .map(|(i, &scalar)| AssetAllocation {
                symbol: format!("A{i}"),
                score: 0,
                scalar,
                weight: scalar * 0.2,
                signals: Vec::new(),
            })
            .collect();
        let cash = 1.0 - assets.iter().map(|a| a.weight).sum::<f64>();
        AllocationSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            assets,
            cash,
        }
    }

    #[test]
    fn identical_days_need_no_rebalance() {
        let r = RebalanceDetector::default()
            .compare(Some(&snap(4, &[1.0, 0.5])), &snap(5, &[1.0, 0.5]));
        assert!(!r.needed);
        assert!(r.deltas.iter().all(|d| d.direction == Direction::Unchanged));
    }

    #[test]
    fn one_scalar_change_flags_rebalance() {
        let r = RebalanceDetector::default()
            .compare(Some(&snap(4, &[1.0, 0.5])), &snap(5, &[1.0, 0.75]));
        assert!(r.needed);
        let d = r.delta("A1").unwrap();
        assert!(d.scalar_changed);
        assert_eq!(d.direction, Direction::Increase);
        assert!((d.delta - 0.05).abs() < 1e-12);
        assert_eq!(r.delta("A0").unwrap().direction, Direction::Unchanged);
    }

    #[test]
    fn decrease_is_reported() {
        let r = RebalanceDetector::default().compare(Some(&snap(4, &[1.0])), &snap(5, &[0.0]));
        assert!(r.needed);
        assert_eq!(r.deltas[0].direction, Direction::Decrease);
    }

    #[test]
    fn no_yesterday_means_no_rebalance() {
        let r = RebalanceDetector::default().compare(None, &snap(5, &[1.0, 0.0]));
        assert!(!r.needed);
        assert_eq!(r.deltas[0].previous_weight, None);
        assert_eq!(r.deltas[0].delta, 0.0);
    }

    #[test]
    fn noise_below_epsilon_is_unchanged() {
        let d = RebalanceDetector::default();
        assert_eq!(d.direction(5e-5), Direction::Unchanged);
        assert_eq!(d.direction(-5e-5), Direction::Unchanged);
        assert_eq!(d.direction(2e-4), Direction::Increase);
    }
}
