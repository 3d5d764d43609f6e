//! Stay timestamps.
//!
//! Every fixture lives in January 2024. Guests arrive at 14:00 and leave at
//! 10:00, so a stay from day `a` to day `b` occupies nights `a..b`.

use chrono::NaiveDate;

/// Calendar day `d` of January 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).expect("valid January day")
}

fn at(d: u32, hour: u32) -> i64 {
    day(d)
        .and_hms_opt(hour, 0, 0)
        .expect("valid hour")
        .and_utc()
        .timestamp()
}

/// Arrival timestamp on day `d`.
pub fn checkin(d: u32) -> i64 {
    at(d, 14)
}

/// Departure timestamp on day `d`.
pub fn checkout(d: u32) -> i64 {
    at(d, 10)
}
