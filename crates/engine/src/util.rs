//! Internal helpers for model validation and conversion.
//!
//! [`parse_date`] is public because the transport layers need the same date
//! policy as the engine; the rest is crate-internal.

use chrono::{DateTime, NaiveDate};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage or input and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidValue(format!("invalid {label} id")))
}

/// Parses a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps keep their own date part; no time zone conversion happens.
pub fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| EngineError::InvalidValue(format!("invalid date: {trimmed}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_date("2024-01-05").unwrap(), expected);
        assert_eq!(parse_date(" 2024-01-05T23:30:00+05:30 ").unwrap(), expected);
        assert_eq!(parse_date("2024-01-05T00:00:00.000Z").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_date("05/01/2024"),
            Err(EngineError::InvalidValue(_))
        ));
        assert!(parse_date("").is_err());
    }
}
