pub mod auth;

pub use auth::{create_token, verify_token, Claims};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Lenient ISO-8601 parsing for query-string date filters: full RFC 3339,
/// a bare `YYYY-MM-DDTHH:MM:SS`, or a date-only `YYYY-MM-DD` (midnight UTC).
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_rfc3339_and_bare_forms() {
        assert!(parse_iso_datetime("2024-01-15T10:30:00Z").is_some());
        assert!(parse_iso_datetime("2024-01-15T10:30:00+05:30").is_some());
        assert!(parse_iso_datetime("2024-01-15T10:30:00").is_some());
        assert!(parse_iso_datetime("2024-01-15").is_some());
    }

    #[test]
    fn date_only_input_means_midnight_utc() {
        let dt = parse_iso_datetime("2024-01-15").unwrap();
        assert_eq!(dt, "2024-01-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_iso_datetime("").is_none());
        assert!(parse_iso_datetime("15/01/2024").is_none());
        assert!(parse_iso_datetime("next tuesday").is_none());
    }
}
