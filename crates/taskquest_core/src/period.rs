//! Day and ISO-week boundaries.
//!
//! Every function keeps the offset of its argument, so callers convert `now`
//! into the profile's local offset first and all boundaries follow from it.

use crate::error::AppError;
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

pub fn start_of_day(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_time(Time::MIDNIGHT)
}

pub fn start_of_next_day(at: OffsetDateTime) -> OffsetDateTime {
    start_of_day(at) + Duration::days(1)
}

/// Monday 00:00 of the ISO week containing `at`.
pub fn start_of_week(at: OffsetDateTime) -> OffsetDateTime {
    let day = start_of_day(at);
    day - Duration::days(i64::from(day.weekday().number_days_from_monday()))
}

pub fn start_of_next_week(at: OffsetDateTime) -> OffsetDateTime {
    start_of_week(at) + Duration::weeks(1)
}

/// The calendar date of `at` as seen from `offset`.
pub fn local_date(at: OffsetDateTime, offset: UtcOffset) -> Date {
    at.to_offset(offset).date()
}

/// Configured offset in minutes, else the system local offset, else UTC.
pub fn resolve_offset(utc_offset_minutes: Option<i16>) -> Result<UtcOffset, AppError> {
    match utc_offset_minutes {
        Some(minutes) => UtcOffset::from_whole_seconds(i32::from(minutes) * 60)
            .map_err(|_| AppError::invalid_input("utc offset is out of range")),
        None => Ok(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)),
    }
}
