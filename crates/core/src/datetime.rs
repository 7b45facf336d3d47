//! Date and date-time strings at the call boundary
//!
//! Front ends pass dates as `yyyy-MM-dd` and date-times as
//! `yyyy-MM-dd'T'HH:mm`. Anything else is rejected with a typed error.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CalendarError, CalendarResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse a `yyyy-MM-dd` date
pub fn parse_date(input: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CalendarError::InvalidDate(input.to_string()))
}

/// Parse a `yyyy-MM-dd'T'HH:mm` date-time
pub fn parse_date_time(input: &str) -> CalendarResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATE_TIME_FORMAT)
        .map_err(|_| CalendarError::InvalidDateTime(input.to_string()))
}

/// Parse an `HH:mm` time of day
pub fn parse_time(input: &str) -> CalendarResult<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| CalendarError::InvalidDateTime(input.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-08").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(format_date(date), "2024-01-08");
    }

    #[test]
    fn test_parse_date_time() {
        let dt = parse_date_time("2024-06-01T14:00").unwrap();
        assert_eq!(format_date_time(dt), "2024-06-01T14:00");
        assert_eq!(format_time(dt.time()), "14:00");
    }

    #[test]
    fn test_malformed_input_is_typed_error() {
        assert_eq!(
            parse_date("01/08/2024"),
            Err(CalendarError::InvalidDate("01/08/2024".to_string()))
        );
        assert!(matches!(
            parse_date_time("2024-06-01 14:00"),
            Err(CalendarError::InvalidDateTime(_))
        ));
        assert!(matches!(
            parse_date_time("2024-02-30T10:00"),
            Err(CalendarError::InvalidDateTime(_))
        ));
        assert!(parse_time("25:00").is_err());
    }
}
