//! Calendar-month date arithmetic and an injectable source of "today".
//!
//! Loan payments fall due on the same day of each month; when the target
//! month is shorter the day is clamped to its last day (31 Jan + 1 month is
//! 28/29 Feb). Calculators never read the system clock themselves: they take
//! an explicit date or a [`Clock`].

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::error::LoanAnalyticsError;
use crate::LoanAnalyticsResult;

/// Source of the current date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Resolve an optional caller-supplied date against a clock.
pub fn resolve_date(date: Option<NaiveDate>, clock: &dyn Clock) -> NaiveDate {
    date.unwrap_or_else(|| clock.today())
}

/// Add calendar months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: u32) -> LoanAnalyticsResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        LoanAnalyticsError::DateError(format!("{date} + {months} months is out of range"))
    })
}

/// Whole calendar months from `from` to `to` (floor). Negative if `to` is earlier.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if months > 0 && to.day() < from.day() && !is_clamped_month_end(from, to) {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}

/// True when `to` is the last day of a month shorter than `from`'s day,
/// i.e. the date `add_months` would have produced.
fn is_clamped_month_end(from: NaiveDate, to: NaiveDate) -> bool {
    to.succ_opt().map_or(false, |next| next.month() != to.month()) && to.day() < from.day()
}
