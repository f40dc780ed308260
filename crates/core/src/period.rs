//! Calendar-month arithmetic.
//!
//! Interest accrues per whole calendar month anchored on the loan start
//! date, and loan eligibility counts whole months of membership. Both
//! need month stepping that survives short months: a loan started on
//! Jan 31 has its February anniversary on Feb 28 (or 29).

use chrono::{Datelike, NaiveDate};

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Adds whole months to a date, clamping the day into the target month.
///
/// Clamping is anchored on the input date's day-of-month, so stepping
/// from an anchor never drifts: Jan 31 + 1 = Feb 28, Jan 31 + 2 = Mar 31.
#[must_use]
pub fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;
    let day = date.day().min(days_in_month(year, month));
    // Constructed from a valid (year, month) pair and a clamped day.
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(date)
}

/// Whole calendar months elapsed from `start` to `end`, saturating at 0.
///
/// A month counts once its anniversary day is reached, where the
/// anniversary of a day that does not exist in the target month falls on
/// that month's last day (Jan 31 -> Feb 28).
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let raw = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let anniversary_reached = end.day() >= start.day()
        || (end.day() == days_in_month(end.year(), end.month())
            && start.day() > days_in_month(end.year(), end.month()));
    let elapsed = if anniversary_reached { raw } else { raw - 1 };
    u32::try_from(elapsed.max(0)).unwrap_or(0)
}
