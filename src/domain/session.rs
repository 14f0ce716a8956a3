use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, SubsecRound};

use crate::{
    error::ParseError,
    time_format::{format_time, parse_time},
};

/// One contiguous interval of tracked work.
///
/// A new session is zero-length and inactive. `start` opens it, `update`
/// keeps its end pinned to the current time while it is active, and `stop`
/// closes it. Timestamps are kept at whole-second resolution, the same
/// resolution the record log stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    begin: NaiveDateTime,
    end: NaiveDateTime,
    active: bool,
}

impl Session {
    pub fn new(now: NaiveDateTime) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            begin: now,
            end: now,
            active: false,
        }
    }

    /// Rebuilds a completed session from a `"HH:MM:SS HH:MM:SS"` log line
    /// belonging to `date`. An end earlier than the begin means the session
    /// ran past midnight.
    pub fn from_persisted(date: NaiveDate, line: &str) -> Result<Self, ParseError> {
        let mut fields = line.split(' ');
        let (Some(begin), Some(end), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(ParseError::Session(line.to_string()));
        };

        let begin = date.and_time(parse_time(begin)?);
        let mut end = date.and_time(parse_time(end)?);
        if end < begin {
            end += Duration::days(1);
        }

        Ok(Self {
            begin,
            end,
            active: false,
        })
    }

    pub fn start(&mut self, now: NaiveDateTime) {
        let now = now.trunc_subsecs(0);
        self.begin = now;
        self.end = now;
        self.active = true;
    }

    pub fn stop(&mut self, now: NaiveDateTime) {
        self.end = now.trunc_subsecs(0).max(self.begin);
        self.active = false;
    }

    pub fn update(&mut self, now: NaiveDateTime) {
        if self.active {
            self.end = now.trunc_subsecs(0).max(self.begin);
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::seconds((self.end - self.begin).num_seconds())
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn begin(&self) -> NaiveDateTime {
        self.begin
    }

    #[cfg(test)]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            format_time(self.begin.time()),
            format_time(self.end.time())
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_new_session_is_zero_length_and_inactive() {
        let session = Session::new(at(day(), 9, 0, 0));
        assert_eq!(session.begin(), session.end());
        assert_eq!(session.elapsed(), Duration::zero());
        assert!(!session.is_active());
    }

    #[test]
    fn test_persisted_line_parses_to_elapsed_minutes() {
        let session = Session::from_persisted(day(), "09:00:00 09:45:00").unwrap();
        assert_eq!(session.elapsed(), Duration::minutes(45));
        assert_eq!(session.begin(), at(day(), 9, 0, 0));
        assert!(!session.is_active());
        assert_eq!(session.to_string(), "09:00:00 09:45:00");
    }

    #[test]
    fn test_persisted_line_across_midnight_ends_next_day() {
        let session = Session::from_persisted(day(), "23:30:00 00:15:00").unwrap();
        assert_eq!(session.elapsed(), Duration::minutes(45));
        assert_eq!(session.to_string(), "23:30:00 00:15:00");
    }

    #[test]
    fn test_malformed_persisted_lines_are_rejected() {
        assert_eq!(
            Session::from_persisted(day(), "09:00:00"),
            Err(ParseError::Session("09:00:00".to_string()))
        );
        assert_eq!(
            Session::from_persisted(day(), "09:00:00  09:45:00"),
            Err(ParseError::Session("09:00:00  09:45:00".to_string()))
        );
        assert_eq!(
            Session::from_persisted(day(), "09:00:00 9:45"),
            Err(ParseError::Time("9:45".to_string()))
        );
    }

    #[test]
    fn test_start_resets_and_update_follows_now() {
        let mut session = Session::new(at(day(), 8, 0, 0));
        session.start(at(day(), 9, 0, 0));
        assert!(session.is_active());
        assert_eq!(session.elapsed(), Duration::zero());

        session.update(at(day(), 9, 10, 0));
        assert_eq!(session.elapsed(), Duration::minutes(10));

        session.stop(at(day(), 9, 20, 0));
        assert!(!session.is_active());
        assert_eq!(session.elapsed(), Duration::minutes(20));

        session.update(at(day(), 10, 0, 0));
        assert_eq!(session.elapsed(), Duration::minutes(20));
    }

    #[test]
    fn test_elapsed_drops_sub_second_precision() {
        let begin = at(day(), 9, 0, 0) + Duration::milliseconds(700);
        let mut session = Session::new(begin);
        session.start(begin);
        session.stop(at(day(), 9, 0, 2) + Duration::milliseconds(200));
        assert_eq!(session.elapsed(), Duration::seconds(2));
        assert_eq!(session.to_string(), "09:00:00 09:00:02");
    }
}
