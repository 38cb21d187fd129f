//! Which close a daily run evaluates.
//!
//! The signal runs the morning after a trading day. Monday looks back to
//! Friday, weekends produce nothing unless test mode is on.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use trendband_core::PriceSeries;

/// The calendar date whose close today's run should evaluate.
///
/// `None` means no run today. Test mode runs every day: weekends use the
/// last Friday, weekdays (Monday included) use yesterday.
pub fn resolve_target_date(today: NaiveDate, test_mode: bool) -> Option<NaiveDate> {
    let back = |days: i64| today.checked_sub_signed(Duration::days(days));
    match (today.weekday(), test_mode) {
        (Weekday::Sat, true) => back(1),
        (Weekday::Sun, true) => back(2),
        (_, true) => back(1),
        (Weekday::Mon, false) => back(3),
        (Weekday::Sat | Weekday::Sun, false) => None,
        (_, false) => back(1),
    }
}

/// The last trading date in `series` on or before `target`.
///
/// Holidays and a target past the end of the data both fall back to the
/// latest available close; `None` when every date is after `target`.
pub fn resolve_trading_date(series: &PriceSeries, target: NaiveDate) -> Option<NaiveDate> {
    let dates = series.dates();
    let end = dates.partition_point(|d| *d <= target);
    end.checked_sub(1).map(|i| dates[i])
}
