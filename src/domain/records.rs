use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::{
    error::{ParseError, TrackerError},
    storage::{self, LogParagraph},
    time_format::{format_date, format_span, parse_date},
};

use super::{Record, Session};

/// What the tracker needs from the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub log_path: PathBuf,
    pub expected_span: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Tracking,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyAverage {
    pub average: Duration,
    pub days: i64,
}

impl fmt::Display for DailyAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} days", format_span(self.average), self.days)
    }
}

/// The full history of tracked days, backed by the record log.
///
/// Past days are kept in date order without gaps; `current` is the day the
/// store was loaded on and the only one that changes.
pub struct Records {
    config: TrackerConfig,
    history: Vec<Record>,
    current: Record,
    state: TrackerState,
    pending_first_save: bool,
}

impl Records {
    pub fn load(config: TrackerConfig, now: NaiveDateTime) -> Result<Self, TrackerError> {
        let today = now.date();
        let paragraphs = storage::read_log(&config.log_path)?;
        let mut history = Vec::with_capacity(paragraphs.len() + 1);
        for paragraph in &paragraphs {
            let record = parse_paragraph(&config.log_path, paragraph)?;
            if record.date() > today {
                return Err(TrackerError::Log {
                    path: config.log_path.clone(),
                    line: paragraph.first_line,
                    source: ParseError::FutureDate(format_date(record.date())),
                });
            }
            push_merged(&mut history, record);
        }

        // Nothing is later than today, so today can only be the last record.
        let pending_first_save = history.last().map(Record::date) != Some(today);
        if pending_first_save {
            history.push(Record::new(now));
        }

        let mut history = fill_gaps(history);
        let current = history.pop().unwrap_or_else(|| Record::new(now));

        info!(
            path = %config.log_path.display(),
            days = history.len() + 1,
            new_day = pending_first_save,
            "loaded record log"
        );

        Ok(Self {
            config,
            history,
            current,
            state: TrackerState::Idle,
            pending_first_save,
        })
    }

    /// Starts a session when idle; stops and saves it when tracking.
    pub fn toggle(&mut self, now: NaiveDateTime) -> Result<TrackerState, TrackerError> {
        match self.state {
            TrackerState::Idle => {
                self.current.start(now);
                self.state = TrackerState::Tracking;
                debug!("session started");
            }
            TrackerState::Tracking => {
                self.current.stop(now);
                self.state = TrackerState::Idle;
                debug!(total = %self.current.today_total_span(), "session stopped");
                self.save()?;
            }
        }
        Ok(self.state)
    }

    pub fn update(&mut self, now: NaiveDateTime) {
        self.current.update(now);
    }

    pub fn save(&mut self) -> Result<(), TrackerError> {
        let written = self
            .current
            .save(&self.config.log_path, self.pending_first_save)?;
        if written > 0 || self.pending_first_save {
            info!(sessions = written, date = %self.current.date(), "saved record");
        }
        self.pending_first_save = false;
        Ok(())
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    #[cfg(test)]
    pub fn is_pending_first_save(&self) -> bool {
        self.pending_first_save
    }

    pub fn last_record(&self) -> &Record {
        &self.current
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.history.iter().chain(std::iter::once(&self.current))
    }

    pub fn day_count(&self) -> usize {
        self.history.len() + 1
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Current session, today's total and time left to the daily target.
    pub fn formatted_spans(&self) -> [String; 3] {
        self.current.formatted_spans(self.config.expected_span)
    }

    pub fn daily_average(&self, now: NaiveDateTime) -> Result<DailyAverage, TrackerError> {
        daily_average(self.iter(), now.date())
    }

    pub fn max_total(&self) -> Duration {
        self.iter()
            .map(Record::total)
            .max()
            .unwrap_or_else(Duration::zero)
    }

    pub fn format_max_span(&self) -> String {
        format_span(self.max_total())
    }
}

fn parse_paragraph(path: &Path, paragraph: &LogParagraph) -> Result<Record, TrackerError> {
    let log_error = |offset: usize, source| TrackerError::Log {
        path: path.to_path_buf(),
        line: paragraph.first_line + offset,
        source,
    };

    let Some((header, lines)) = paragraph.lines.split_first() else {
        return Err(log_error(0, ParseError::Date(String::new())));
    };

    let date = parse_date(header).map_err(|e| log_error(0, e))?;
    Record::from_persisted(date, lines).map_err(|e| {
        let offset = lines
            .iter()
            .position(|line| Session::from_persisted(date, line).is_err())
            .map_or(1, |i| i + 1);
        log_error(offset, e)
    })
}

/// Appends `record` keeping one record per date. A paragraph for a date
/// already present is folded into the existing record.
fn push_merged(history: &mut Vec<Record>, record: Record) {
    if let Some(existing) = history.iter_mut().find(|r| r.date() == record.date()) {
        warn!(date = %record.date(), "duplicate day in record log, merging");
        existing.absorb(record);
        return;
    }

    let position = history.partition_point(|r| r.date() < record.date());
    if position < history.len() {
        warn!(date = %record.date(), "record log out of date order");
    }
    history.insert(position, record);
}

/// Inserts an empty record for every date missing between the first and
/// last record. `records` must be sorted by date.
pub fn fill_gaps(records: Vec<Record>) -> Vec<Record> {
    let mut filled: Vec<Record> = Vec::with_capacity(records.len());
    for record in records {
        if let Some(previous) = filled.last().map(Record::date) {
            let mut date = previous.succ_opt();
            while let Some(missing) = date.filter(|d| *d < record.date()) {
                filled.push(Record::placeholder(missing));
                date = missing.succ_opt();
            }
        }
        filled.push(record);
    }
    filled
}

/// Total tracked time spread over the calendar days from the first record
/// through `today`, inclusive.
pub fn daily_average<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    today: NaiveDate,
) -> Result<DailyAverage, TrackerError> {
    let mut records = records.into_iter().peekable();
    let first_date = records
        .peek()
        .map(|record| record.date())
        .ok_or(TrackerError::EmptyHistory)?;

    let days = (today - first_date).num_days() + 1;
    if days <= 0 {
        return Err(TrackerError::EmptyHistory);
    }

    let total_seconds: i64 = records.map(|record| record.total().num_seconds()).sum();
    Ok(DailyAverage {
        average: Duration::seconds(total_seconds / days),
        days,
    })
}
