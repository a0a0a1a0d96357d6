//! Time normalization: any time-like cell to a comparable instant, or `None`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use callstat_types::TimeValue;

/// Formats tried, in order, on textual cells. First match wins.
pub const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%H:%M:%S%.f"];

/// Date attached to bare times. Only time-of-day is ever compared.
pub fn reference_date() -> NaiveDate {
    NaiveDate::default()
}

/// Strict parse: surrounding whitespace and leap seconds (`23:59:60`) are
/// rejected.
pub fn parse_time_text(text: &str) -> Option<NaiveTime> {
    if text.trim() != text {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .filter(|t| t.nanosecond() < 1_000_000_000)
}

/// Malformed or unsupported cells degrade to `None`; this never fails.
pub fn normalize_time(value: TimeValue<'_>) -> Option<NaiveDateTime> {
    match value {
        TimeValue::Missing | TimeValue::Unsupported => None,
        TimeValue::Text(text) => parse_time_text(text).map(|t| reference_date().and_time(t)),
        TimeValue::Time(t) => Some(reference_date().and_time(t)),
        TimeValue::DateTime(dt) => Some(dt),
    }
}
