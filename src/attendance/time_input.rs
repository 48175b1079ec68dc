use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValidationError;

/// Wall-clock time of the server. All attendance timestamps are naive local time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateFormat(value.to_string()))
}

/// Combines `date` with an `HH:MM` time of day; seconds are always zero.
pub fn parse_time_on(date: NaiveDate, value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|t| date.and_time(t))
        .map_err(|_| ValidationError::InvalidTimeFormat(value.to_string()))
}

/// Like [`parse_time_on`], but an absent or blank value means "no time".
pub fn parse_optional_time_on(
    date: NaiveDate,
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_time_on(date, v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn combines_time_with_date() {
        let ts = parse_time_on(day(), "09:30").unwrap();
        assert_eq!(ts, day().and_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["9", "25:00", "09:60", "09:00:00", "nine", ""] {
            assert_eq!(
                parse_time_on(day(), bad),
                Err(ValidationError::InvalidTimeFormat(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn blank_optional_time_is_none() {
        assert_eq!(parse_optional_time_on(day(), None), Ok(None));
        assert_eq!(parse_optional_time_on(day(), Some("  ")), Ok(None));
        assert!(parse_optional_time_on(day(), Some("18:00")).unwrap().is_some());
        assert!(parse_optional_time_on(day(), Some("18-00")).is_err());
    }

    #[test]
    fn parses_dates() {
        assert_eq!(parse_date("2026-01-05"), Ok(day()));
        assert!(matches!(
            parse_date("2026/01/05"),
            Err(ValidationError::InvalidDateFormat(_))
        ));
    }
}
