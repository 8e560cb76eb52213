// Utility functions
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses the date text written by a sync job into a calendar day, dropping any
/// time-of-day component. Timestamps keep the calendar date as written; no
/// timezone conversion is applied.
pub fn parse_day(date_str: &str) -> Option<NaiveDate> {
    let s = date_str.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// Percent change from `previous` to `current`; 0 when there is no positive baseline.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Converts an SQLite integer column into a count, clamping negatives to zero.
pub fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_day("2024-01-02"), Some(day(2024, 1, 2)));
        assert_eq!(parse_day(" 2024/01/02 "), Some(day(2024, 1, 2)));
        assert_eq!(parse_day("02.01.2024"), Some(day(2024, 1, 2)));
        assert_eq!(parse_day("20240102"), Some(day(2024, 1, 2)));
    }

    #[test]
    fn strips_time_of_day() {
        assert_eq!(parse_day("2024-01-02 23:59:59"), Some(day(2024, 1, 2)));
        assert_eq!(parse_day("2024-01-02T08:15:00.250"), Some(day(2024, 1, 2)));
        // the written calendar date wins over the UTC instant
        assert_eq!(parse_day("2024-01-02T23:30:00-05:00"), Some(day(2024, 1, 2)));
        assert_eq!(parse_day("2024-01-02T00:10:00Z"), Some(day(2024, 1, 2)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day("2024-13-01"), None);
    }

    #[test]
    fn percent_change_without_baseline_is_zero() {
        assert_eq!(percent_change(0.0, 50.0), 0.0);
        assert_eq!(percent_change(100.0, 150.0), 50.0);
        assert_eq!(percent_change(200.0, 100.0), -50.0);
    }
}
