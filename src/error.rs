use std::{io, path::PathBuf};

use thiserror::Error;

/// Malformed text in the record log or in a configured value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid time '{0}', expected HH:MM:SS")]
    Time(String),

    #[error("invalid span '{0}', expected H:MM:SS")]
    Span(String),

    #[error("invalid session '{0}', expected 'HH:MM:SS HH:MM:SS'")]
    Session(String),

    #[error("date '{0}' is after today")]
    FutureDate(String),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{}:{line}: {source}", .path.display())]
    Log {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },

    #[error("invalid config value: {0}")]
    Config(#[from] ParseError),

    #[error("no recorded days to average")]
    EmptyHistory,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("config file error: {0}")]
    Json(#[from] serde_json::Error),
}
