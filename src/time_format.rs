//! Fixed text formats shared by the record log, the readout and the CLI.
//!
//! Dates are `YYYY-MM-DD`, times of day are `HH:MM:SS` and spans are
//! `H:MM:SS` with an hours field of any width.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::ParseError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Renders the magnitude of `span`; callers prepend `-` for negative spans.
pub fn format_span(span: Duration) -> String {
    let seconds = span.num_seconds().unsigned_abs();
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .filter(|date| format_date(*date) == text)
        .ok_or_else(|| ParseError::Date(text.to_string()))
}

pub fn parse_time(text: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .ok()
        .filter(|time| format_time(*time) == text)
        .ok_or_else(|| ParseError::Time(text.to_string()))
}

pub fn parse_span(text: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::Span(text.to_string());

    let mut parts = text.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || minutes.len() != 2 || seconds.len() != 2 {
        return Err(invalid());
    }
    if !all_digits(minutes) || !all_digits(seconds) {
        return Err(invalid());
    }

    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_span_pads_minutes_and_seconds_only() {
        assert_eq!(format_span(Duration::zero()), "0:00:00");
        assert_eq!(format_span(Duration::seconds(45 * 60)), "0:45:00");
        assert_eq!(format_span(Duration::seconds(3 * 3600 + 7)), "3:00:07");
        assert_eq!(format_span(Duration::hours(31) + Duration::minutes(5)), "31:05:00");
    }

    #[test]
    fn test_format_span_uses_magnitude_of_negative_spans() {
        assert_eq!(format_span(Duration::minutes(-15)), "0:15:00");
    }

    #[test]
    fn test_parse_date_is_strict() {
        let date = parse_date("2024-01-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(format_date(date), "2024-01-05");

        assert!(parse_date("2024-1-5").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("05/01/2024").is_err());
        assert_eq!(
            parse_date(""),
            Err(ParseError::Date(String::new()))
        );
    }

    #[test]
    fn test_parse_time_is_strict() {
        let time = parse_time("09:05:00").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(format_time(time), "09:05:00");

        assert!(parse_time("9:05:00").is_err());
        assert!(parse_time("24:00:00").is_err());
        assert!(parse_time("09:05").is_err());
    }

    #[test]
    fn test_parse_span_inverts_format_span() {
        for text in ["0:00:00", "8:00:00", "123:59:59"] {
            assert_eq!(format_span(parse_span(text).unwrap()), text);
        }
        assert_eq!(parse_span("8:00:00").unwrap(), Duration::hours(8));

        assert!(parse_span("8:00").is_err());
        assert!(parse_span("8:60:00").is_err());
        assert!(parse_span("-1:00:00").is_err());
        assert!(parse_span("1:2:03").is_err());
    }
}
