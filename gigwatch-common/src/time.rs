//! Timestamp utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Milliseconds in one day
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Date-time layouts accepted after RFC 3339 has been tried
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole days as a chrono duration
pub fn days(count: u32) -> chrono::Duration {
    chrono::Duration::milliseconds(i64::from(count) * MILLIS_PER_DAY)
}

/// Parse an ISO-8601 concert date
///
/// Accepts full RFC 3339 timestamps, offset-less date-times and bare dates.
/// Values without an offset are read as UTC; a bare date is midnight UTC.
/// Returns `None` for anything else.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // After 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_days_matches_millis_per_day() {
        assert_eq!(days(7).num_milliseconds(), 7 * MILLIS_PER_DAY);
        assert_eq!(days(0).num_milliseconds(), 0);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_iso8601("2025-06-01T20:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_zulu() {
        let parsed = parse_iso8601("2025-06-01T20:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_date_time_as_utc() {
        let parsed = parse_iso8601("2025-06-01T20:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 20, 30, 0).unwrap());

        let parsed = parse_iso8601("2025-06-01T20:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 20, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date_is_midnight_utc() {
        let parsed = parse_iso8601(" 2025-06-01 ").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_iso8601("next tuesday"), None);
        assert_eq!(parse_iso8601(""), None);
        assert_eq!(parse_iso8601("2025-13-01"), None);
    }
}
