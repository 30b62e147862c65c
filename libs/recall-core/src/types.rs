//! Core types for the review scheduler.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Easiness factor assigned to a card that has never been reviewed.
pub const INITIAL_EASINESS: f64 = 2.5;

/// Floor below which the easiness factor is never allowed to fall.
pub const MINIMUM_EASINESS: f64 = 1.3;

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Quality signal consumed by the scheduler.
    pub fn quality(self) -> Quality {
        Quality(match self {
            Self::Again => 0,
            Self::Hard => 1,
            Self::Good => 2,
            Self::Easy => 3,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse: case-insensitive, surrounding whitespace ignored.
impl FromStr for Rating {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str() == normalized)
            .ok_or_else(|| ScheduleError::UnknownRating(s.to_string()))
    }
}

/// Recall quality in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Result<Self, ScheduleError> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(ScheduleError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn rating(self) -> Rating {
        Rating::ALL[self.0 as usize]
    }

    /// Again and hard both count as a lapse.
    pub fn is_lapse(self) -> bool {
        self.0 < 2
    }
}

impl TryFrom<u8> for Quality {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl From<Rating> for Quality {
    fn from(rating: Rating) -> Self {
        rating.quality()
    }
}

/// SM-2 memory state carried by every card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub easiness_factor: f64,
    /// Days until the next review; 0 for a card that was never reviewed.
    pub interval: u32,
    /// Consecutive successful recalls since the last lapse.
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
}

impl MemoryState {
    /// State of a freshly created card, due immediately.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            easiness_factor: INITIAL_EASINESS,
            interval: 0,
            repetitions: 0,
            next_review: created_at,
        }
    }

    pub fn is_new(&self) -> bool {
        self.interval == 0
    }
}

/// A collection of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Card with its memory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub deck_id: i64,
    pub question: String,
    pub answer: String,
    #[serde(flatten)]
    pub state: MemoryState,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn next_review(&self) -> DateTime<Utc> {
        self.state.next_review
    }
}
