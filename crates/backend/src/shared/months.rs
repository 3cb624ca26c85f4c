//! Month arithmetic used by customer classification.
//!
//! All "how many months ago" questions go through [`months_between`] so the policy can be
//! switched in config without touching the engine.

use chrono::{Datelike, NaiveDateTime};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MonthPolicy {
    /// floor(days / 30)
    #[default]
    ThirtyDay,
    /// Whole calendar months elapsed
    Calendar,
}

/// Whole months from `earlier` to `later` (negative if `later` precedes `earlier`)
pub fn months_between(policy: MonthPolicy, later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    match policy {
        MonthPolicy::ThirtyDay => (later - earlier).num_days().div_euclid(30),
        MonthPolicy::Calendar => calendar_months(later, earlier),
    }
}

fn calendar_months(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    if later < earlier {
        return -calendar_months(earlier, later);
    }
    let mut months = (later.year() as i64 - earlier.year() as i64) * 12
        + (later.month() as i64 - earlier.month() as i64);
    // Incomplete last month
    if (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_thirty_day_policy() {
        let p = MonthPolicy::ThirtyDay;
        assert_eq!(months_between(p, at(2024, 6, 15), at(2024, 6, 1)), 0);
        assert_eq!(months_between(p, at(2024, 7, 1), at(2024, 6, 1)), 1);
        // 365 days is 12 thirty-day months
        assert_eq!(months_between(p, at(2025, 6, 1), at(2024, 6, 1)), 12);
        // 334 days (Jul 1 -> Jun 1 of a non-leap span) is only 11
        assert_eq!(months_between(p, at(2025, 6, 1), at(2024, 7, 2)), 11);
    }

    #[test]
    fn test_calendar_policy() {
        let p = MonthPolicy::Calendar;
        assert_eq!(months_between(p, at(2024, 3, 1), at(2024, 1, 31)), 1);
        assert_eq!(months_between(p, at(2024, 3, 30), at(2024, 1, 31)), 1);
        assert_eq!(months_between(p, at(2024, 3, 31), at(2024, 1, 31)), 2);
        assert_eq!(months_between(p, at(2024, 1, 31), at(2024, 3, 31)), -2);
    }
}
