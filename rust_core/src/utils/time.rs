//! Provider timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Naive formats seen across providers, all interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a provider timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-01-15T19:00:00Z`, with offsets) and the looser
/// forms ESPN and TheSportsDB emit (`2024-01-15T19:00Z`, `2024-01-15 19:00:00`).
pub fn parse_provider_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Combine separate date and time fields (`"2024-01-15"`, `"19:00:00"`).
///
/// A missing or unparseable time falls back to midnight.
pub fn parse_date_and_time(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time
        .and_then(|t| {
            let t = t.trim().trim_end_matches("+00:00");
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        })
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_rfc3339() {
        let dt = parse_provider_datetime("2024-01-15T19:00:00+01:00").unwrap();
        assert_eq!(dt.hour(), 18);
    }

    #[test]
    fn test_espn_short_form() {
        let dt = parse_provider_datetime("2024-01-15T19:00Z").unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 19);
    }

    #[test]
    fn test_sportsdb_timestamp() {
        let dt = parse_provider_datetime("2024-01-15T19:30:00").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_garbage() {
        assert!(parse_provider_datetime("").is_none());
        assert!(parse_provider_datetime("tomorrow evening").is_none());
    }

    #[test]
    fn test_date_and_time() {
        let dt = parse_date_and_time("2024-01-15", Some("19:45:00")).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (19, 45));

        let midnight = parse_date_and_time("2024-01-15", None).unwrap();
        assert_eq!(midnight.hour(), 0);

        assert!(parse_date_and_time("15/01/2024", None).is_none());
    }
}
