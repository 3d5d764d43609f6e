//! Calendar helpers over UNIX timestamps.
//!
//! Stay windows are stored as second-resolution timestamps. Day arithmetic is
//! performed in UTC so that the same input always yields the same nights.

use chrono::{DateTime, NaiveDate};

use crate::error::{RelocationError, Result};

/// Number of seconds in one calendar day.
pub const DAY_SECONDS: i64 = 86_400;

/// Returns the calendar day containing the given timestamp.
pub fn day_of(ts: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| RelocationError::invalid(format!("timestamp {ts} is out of range")))
}

/// Returns the timestamp of the last night before a departure:
/// one day before `checkout`, at 23:59:59.
pub fn last_night_of(checkout: i64) -> Result<i64> {
    let day = day_of(checkout - DAY_SECONDS)?;
    end_of_day(day)
}

/// Returns the timestamp of 00:00:00 on the given day.
pub fn start_of_day(day: NaiveDate) -> Result<i64> {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| RelocationError::invalid(format!("invalid day {day}")))
}

/// Returns the timestamp of 23:59:59 on the given day.
pub fn end_of_day(day: NaiveDate) -> Result<i64> {
    day.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| RelocationError::invalid(format!("invalid day {day}")))
}

/// Iterates every day in `[from, to]`. Empty when `from > to`.
pub fn days_in(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}
