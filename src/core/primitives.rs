use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Timelike, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Converts a decimal dose or rate into `f64`, mapping unrepresentable values to zero.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Signed distance `to - from` in seconds with millisecond resolution.
#[must_use]
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

#[must_use]
pub fn truncate_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Midnight of the calendar day containing `time`, where days are counted in `offset`.
#[must_use]
pub fn start_of_day(time: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = time.with_timezone(&offset).date_naive();
    local
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| offset.from_local_datetime(&midnight).single())
        .map_or(time, |midnight| midnight.with_timezone(&Utc))
}

/// Formats with at most `max_dp` fraction digits, `.` separator and no trailing zeros.
#[must_use]
pub fn format_decimal(value: Decimal, max_dp: u32) -> String {
    value.round_dp(max_dp).normalize().to_string()
}

/// `time + minutes`, saturating to `time` when the offset is out of chrono's range.
#[must_use]
pub fn add_minutes(time: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| time.checked_add_signed(delta))
        .unwrap_or(time)
}
