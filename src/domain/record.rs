use std::{fmt::Write as _, io, path::Path};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    error::ParseError,
    storage,
    time_format::{format_date, format_span},
};

use super::Session;

/// All sessions tracked on one calendar date.
///
/// The last session is always the pending one: zero-length until started,
/// in progress while tracking, and never written to the log. Sessions before
/// `saved_sessions` are already in the log file.
#[derive(Clone, Debug)]
pub struct Record {
    date: NaiveDate,
    sessions: Vec<Session>,
    saved_sessions: usize,
    total: Duration,
}

impl Record {
    pub fn new(now: NaiveDateTime) -> Self {
        Self::from_sessions(now.date(), Vec::new(), Session::new(now))
    }

    /// An empty day synthesized to fill a gap in the log.
    pub fn placeholder(date: NaiveDate) -> Self {
        Self::from_sessions(date, Vec::new(), Session::new(date.and_time(NaiveTime::MIN)))
    }

    pub fn from_persisted<S: AsRef<str>>(date: NaiveDate, lines: &[S]) -> Result<Self, ParseError> {
        let sessions = lines
            .iter()
            .map(|line| Session::from_persisted(date, line.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_saved_sessions(date, sessions))
    }

    /// Builds a record whose `sessions` are already in the log and appends
    /// the pending session.
    fn with_saved_sessions(date: NaiveDate, sessions: Vec<Session>) -> Self {
        Self::from_sessions(date, sessions, Session::new(date.and_time(NaiveTime::MIN)))
    }

    fn from_sessions(date: NaiveDate, mut sessions: Vec<Session>, pending: Session) -> Self {
        let saved_sessions = sessions.len();
        sessions.push(pending);
        let mut record = Self {
            date,
            sessions,
            saved_sessions,
            total: Duration::zero(),
        };
        record.recompute_total();
        record
    }

    /// Moves the saved sessions of `other`, a later paragraph for the same
    /// date, in front of this record's pending session.
    pub(super) fn absorb(&mut self, other: Record) {
        let pending = self.sessions.pop();
        let saved = other.saved_sessions;
        self.sessions.extend(other.sessions.into_iter().take(saved));
        self.sessions.extend(pending);
        self.saved_sessions += saved;
        self.recompute_total();
    }

    pub fn start(&mut self, now: NaiveDateTime) {
        self.last_session_mut().start(now);
    }

    pub fn stop(&mut self, now: NaiveDateTime) {
        self.last_session_mut().stop(now);
        self.sessions.push(Session::new(now));
        self.recompute_total();
    }

    pub fn update(&mut self, now: NaiveDateTime) {
        self.last_session_mut().update(now);
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = self
            .sessions
            .iter()
            .map(Session::elapsed)
            .fold(Duration::zero(), |acc, span| acc + span);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn last_session(&self) -> &Session {
        // `sessions` always ends with the pending session.
        &self.sessions[self.sessions.len() - 1]
    }

    fn last_session_mut(&mut self) -> &mut Session {
        let last = self.sessions.len() - 1;
        &mut self.sessions[last]
    }

    #[cfg(test)]
    pub fn is_tracking(&self) -> bool {
        self.last_session().is_active()
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn total_seconds(&self) -> u64 {
        self.total.num_seconds().max(0) as u64
    }

    #[cfg(test)]
    pub fn saved_sessions(&self) -> usize {
        self.saved_sessions
    }

    pub fn current_session_span(&self) -> String {
        format_span(self.last_session().elapsed())
    }

    pub fn today_total_span(&self) -> String {
        format_span(self.total)
    }

    pub fn today_left_span(&self, target: Duration) -> String {
        let left = format_span(target - self.total);
        if self.total > target {
            format!("-{}", left)
        } else {
            left
        }
    }

    /// Current session, day total and time left, in display order.
    pub fn formatted_spans(&self, target: Duration) -> [String; 3] {
        [
            self.current_session_span(),
            self.today_total_span(),
            self.today_left_span(target),
        ]
    }

    /// Log text not yet written for this record: the date header when the
    /// day has never been saved, then every completed unsaved session.
    pub fn unsaved_entry(&self, first_save: bool) -> String {
        let mut entry = String::new();
        if first_save {
            let _ = write!(entry, "\n{}\n", format_date(self.date));
        }
        for session in &self.sessions[self.saved_sessions..self.sessions.len() - 1] {
            let _ = writeln!(entry, "{}", session);
        }
        entry
    }

    /// Appends the unsaved entry to the log at `path` and returns how many
    /// sessions were written. Nothing is marked saved if the write fails.
    pub fn save(&mut self, path: &Path, first_save: bool) -> io::Result<usize> {
        let entry = self.unsaved_entry(first_save);
        if !entry.is_empty() {
            storage::append_to_log(path, &entry)?;
        }

        let completed = self.sessions.len() - 1;
        let written = completed - self.saved_sessions;
        self.saved_sessions = completed;
        Ok(written)
    }
}
