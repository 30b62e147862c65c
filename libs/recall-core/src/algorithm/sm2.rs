//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with a four-point quality scale (0 = again,
//! 3 = easy). Hard counts as a lapse: it costs less easiness than again but
//! resets the interval and repetition count the same way.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, ScheduleError};
use crate::types::{MemoryState, Quality, INITIAL_EASINESS, MINIMUM_EASINESS};

/// SM-2 algorithm parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub easy_bonus: f64,
    pub first_interval: u32,
    pub second_interval: u32,
    pub lapse_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASINESS,
            minimum_ease: MINIMUM_EASINESS,
            easy_bonus: 1.3,
            first_interval: 1,
            second_interval: 6,
            lapse_interval: 1,
        }
    }
}

/// Schedule one review with the default parameters.
///
/// Returns the new easiness factor, interval, repetition count and the
/// absolute time the card is due again.
pub fn advance(
    quality: u8,
    easiness_factor: f64,
    interval: u32,
    repetitions: u32,
    now: DateTime<Utc>,
) -> Result<MemoryState> {
    Sm2::default().advance(Quality::new(quality)?, easiness_factor, interval, repetitions, now)
}

impl Sm2 {
    pub fn initial_state(&self, created_at: DateTime<Utc>) -> MemoryState {
        MemoryState {
            easiness_factor: self.initial_ease,
            ..MemoryState::new(created_at)
        }
    }

    /// Schedule a review of a card in `state`.
    pub fn schedule(&self, state: &MemoryState, quality: Quality, now: DateTime<Utc>) -> Result<MemoryState> {
        self.advance(
            quality,
            state.easiness_factor,
            state.interval,
            state.repetitions,
            now,
        )
    }

    pub fn advance(
        &self,
        quality: Quality,
        easiness_factor: f64,
        interval: u32,
        repetitions: u32,
        now: DateTime<Utc>,
    ) -> Result<MemoryState> {
        if !easiness_factor.is_finite() || easiness_factor < self.minimum_ease {
            return Err(ScheduleError::InvalidEasiness {
                value: easiness_factor,
                minimum: self.minimum_ease,
            });
        }

        let new_ease = self.next_ease(easiness_factor, quality);

        let (new_interval, new_repetitions) = if quality.is_lapse() {
            (self.lapse_interval, 0)
        } else {
            let repetitions = repetitions.saturating_add(1);
            let base = match repetitions {
                1 => self.first_interval,
                2 => self.second_interval,
                _ => round_days(f64::from(interval) * new_ease),
            };
            let interval = if quality.value() == Quality::MAX {
                round_days(f64::from(base) * self.easy_bonus)
            } else {
                base
            };
            // A reviewed card is never due the same day; 0 marks unseen cards.
            (interval.max(1), repetitions)
        };

        let next_review = now
            .checked_add_signed(Duration::days(i64::from(new_interval)))
            .ok_or(ScheduleError::DateOverflow {
                interval: new_interval,
            })?;

        Ok(MemoryState {
            easiness_factor: new_ease,
            interval: new_interval,
            repetitions: new_repetitions,
            next_review,
        })
    }

    fn next_ease(&self, easiness_factor: f64, quality: Quality) -> f64 {
        let miss = f64::from(Quality::MAX - quality.value());
        let ease = easiness_factor + (0.1 - miss * (0.08 + miss * 0.02));
        if ease < self.minimum_ease {
            self.minimum_ease
        } else {
            ease
        }
    }
}

/// Round half to even, saturating at the bounds of `u32`.
fn round_days(days: f64) -> u32 {
    days.round_ties_even() as u32
}
