//! Error types for recall-core.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using ScheduleError.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Domain violations rejected by the rating mapper and the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("quality must be between 0 and 3, got {0}")]
    InvalidQuality(u8),

    #[error("easiness factor must be a finite number of at least {minimum}, got {value}")]
    InvalidEasiness { value: f64, minimum: f64 },

    #[error("unknown rating: {0:?}")]
    UnknownRating(String),

    #[error("next review date out of range for interval of {interval} days")]
    DateOverflow { interval: u32 },

    #[error("calendar of {days} days starting {from} runs past the supported date range")]
    CalendarOverflow { from: NaiveDate, days: u32 },
}

/// Errors raised by the card store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("deck not found: {0}")]
    DeckNotFound(i64),

    #[error("card not found: {0}")]
    CardNotFound(i64),

    #[error("deck already exists: {0}")]
    DuplicateDeck(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised while walking a study session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no cards due in deck {0}")]
    NothingDue(i64),

    #[error("study session already finished")]
    Finished,

    #[error(transparent)]
    Store(#[from] StoreError),
}
