//! Property tests for target-date resolution.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use trendband_core::PriceSeries;
use trendband_runner::{resolve_target_date, resolve_trading_date};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Duration::days(offset))
}

fn is_weekend(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

proptest! {
    #[test]
    fn scheduled_target_is_a_recent_weekday(today in arb_date()) {
        match resolve_target_date(today, false) {
            None => prop_assert!(is_weekend(today)),
            Some(target) => {
                prop_assert!(!is_weekend(today));
                prop_assert!(!is_weekend(target));
                prop_assert!(target < today);
                prop_assert!(today - target <= Duration::days(3));
            }
        }
    }

    #[test]
    fn test_mode_always_has_a_target(today in arb_date()) {
        let target = resolve_target_date(today, true);
        prop_assert!(target.is_some());
        let target = target.unwrap();
        prop_assert!(target < today);
        if is_weekend(today) {
            prop_assert_eq!(target.weekday(), Weekday::Fri);
        }
    }

    #[test]
    fn trading_date_is_latest_on_or_before(
        gaps in prop::collection::vec(1i64..5, 1..40),
        offset in 0i64..200,
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = gaps
            .iter()
            .scan(start, |d, g| {
                *d += Duration::days(*g);
                Some(*d)
            })
            .collect();
        let closes = vec![1.0; dates.len()];
        let series = PriceSeries::new(dates.clone(), vec![("AAA".into(), closes)]).unwrap();

        let target = start + Duration::days(offset);
        let expected = dates.iter().copied().filter(|d| *d <= target).max();
        prop_assert_eq!(resolve_trading_date(&series, target), expected);
    }
}
