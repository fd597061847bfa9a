//! SQLite helper utilities for type conversion
//!
//! Timestamps are stored as fixed-width RFC 3339 TEXT in UTC so that
//! lexical ordering in SQL matches chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp as a sortable string for SQLite
#[inline]
pub fn now_iso8601() -> String {
    datetime_to_str(Utc::now())
}

/// Convert a chrono DateTime to its stored form
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn str_to_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional stored timestamp, treating empty strings as absent
pub fn str_to_datetime_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(str_to_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Map a timestamp parse failure into a row decode error
pub(crate) fn decode_err(e: chrono::ParseError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE ... ESCAPE '\'`
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_stored_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::microseconds(1500);
        assert!(datetime_to_str(earlier) < datetime_to_str(later));
        assert_eq!(datetime_to_str(earlier), "2024-01-01T09:00:00.000000Z");
    }

    #[test]
    fn test_parse_round_trips_stored_form() {
        let stored = "2024-03-15T10:30:00.250000Z";
        let dt = str_to_datetime(stored).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(datetime_to_str(dt), stored);
        assert!(str_to_datetime("2024-03-15 10:30:00").is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert!(str_to_datetime_opt(None).unwrap().is_none());
        assert!(str_to_datetime_opt(Some("")).unwrap().is_none());
        assert!(str_to_datetime_opt(Some("2024-01-01T00:00:00Z")).unwrap().is_some());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
