//! Calendar date parsing shared by query filtering and payload validation.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Parse a value as a calendar day.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (whose UTC day is taken).
/// Returns `None` for anything that is not a real calendar date, e.g. `2024-02-30`.
pub fn parse_calendar_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if DATE_ONLY.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

/// Parse a value as a point in time.
///
/// Date-only values resolve to midnight UTC; RFC 3339 timestamps keep their time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if DATE_ONLY.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(start_of_day);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Midnight UTC of the given day
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

/// Half-open `[start, end)` interval covering one whole UTC day
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(day);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_day() {
        assert_eq!(
            parse_calendar_day("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            parse_calendar_day("2024-03-01T23:30:00-02:00"),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
        assert_eq!(parse_calendar_day("2024-02-30"), None);
        assert_eq!(parse_calendar_day("2023-02-29"), None);
        assert_eq!(parse_calendar_day("2024-2-3"), None);
        assert_eq!(parse_calendar_day("yesterday"), None);
        assert_eq!(parse_calendar_day(""), None);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T00:00:00+00:00");

        let ts = parse_timestamp("2024-05-01T10:15:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:15:00+00:00");

        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(start.to_rfc3339(), "2024-12-31T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
