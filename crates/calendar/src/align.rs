//! Fiscal alignment helpers.

use chrono::{Datelike, Duration, Months};
use hanover_primitives::Date;

/// Shift a date by a signed number of calendar months, clamping to the
/// end of the target month where needed.
#[must_use]
pub fn add_months(date: Date, months: i32) -> Date {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32)).unwrap_or(Date::MAX)
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs())).unwrap_or(Date::MIN)
    }
}

/// Last calendar day of the given month.
#[must_use]
pub fn month_end(year: i32, month: u32) -> Date {
    let first = Date::from_ymd_opt(year, month, 1).unwrap_or_default();
    add_months(first, 1) - Duration::days(1)
}

/// Calendar months elapsed from `earlier` to `later`, counted by month
/// index so that a December fiscal year end is six months before the
/// following June regardless of day-of-month.
///
/// Negative when `later` precedes `earlier`.
#[must_use]
pub fn months_between(earlier: Date, later: Date) -> i32 {
    (later.year() - earlier.year()) * 12 + later.month() as i32 - earlier.month() as i32
}

/// Whether a fiscal year ending at `fiscal_year_end` is usable at a
/// formation date: public for at least `lag_months` and no staler than
/// `max_staleness_months`.
#[must_use]
pub fn fundamental_usable(
    fiscal_year_end: Date,
    formation: Date,
    lag_months: i32,
    max_staleness_months: i32,
) -> bool {
    let age = months_between(fiscal_year_end, formation);
    age >= lag_months && age <= max_staleness_months
}
