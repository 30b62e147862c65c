//! Study sessions.
//!
//! A session is a walk through one deck's due set taken at start time. It is
//! an ordinary value owned by whoever started it; nothing about it is global.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::algorithm::Sm2;
use crate::error::SessionError;
use crate::store::ReviewRepository;
use crate::types::{Card, Rating};

/// Outcome of a finished or abandoned session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub deck_id: i64,
    pub total: usize,
    pub reviewed: usize,
    pub lapses: usize,
    pub started_at: DateTime<Utc>,
}

/// Result of rating or skipping the current card.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    Next {
        /// The card as stored after the review, if it was rated.
        reviewed: Option<Card>,
        next: Card,
        position: usize,
        total: usize,
    },
    Complete {
        reviewed: Option<Card>,
        summary: SessionSummary,
    },
}

#[derive(Debug, Clone)]
pub struct StudySession {
    deck_id: i64,
    cards: Vec<Card>,
    index: usize,
    reviewed: usize,
    lapses: usize,
    started_at: DateTime<Utc>,
}

impl StudySession {
    /// Start a session over `due`, which should already be in due order.
    pub fn start(deck_id: i64, due: Vec<Card>, now: DateTime<Utc>) -> Result<Self, SessionError> {
        if due.is_empty() {
            return Err(SessionError::NothingDue(deck_id));
        }
        Ok(Self {
            deck_id,
            cards: due,
            index: 0,
            reviewed: 0,
            lapses: 0,
            started_at: now,
        })
    }

    pub fn deck_id(&self) -> i64 {
        self.deck_id
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.index)
    }

    /// 1-based position of the current card.
    pub fn position(&self) -> usize {
        (self.index + 1).min(self.cards.len())
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }

    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.cards.len()
    }

    /// Review the current card and move on.
    ///
    /// The cursor only advances once the store accepted the review.
    pub fn rate<S>(&mut self, store: &S, rating: Rating, sm2: &Sm2, now: DateTime<Utc>) -> Result<SessionStep, SessionError>
    where
        S: ReviewRepository + ?Sized,
    {
        let card_id = self.current().ok_or(SessionError::Finished)?.id;
        let reviewed = store.review_card(card_id, rating.quality(), now, sm2)?;
        self.reviewed += 1;
        if rating.quality().is_lapse() {
            self.lapses += 1;
        }
        Ok(self.advance(Some(reviewed)))
    }

    /// Move past the current card without reviewing it.
    pub fn skip(&mut self) -> Result<SessionStep, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Finished);
        }
        Ok(self.advance(None))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            deck_id: self.deck_id,
            total: self.cards.len(),
            reviewed: self.reviewed,
            lapses: self.lapses,
            started_at: self.started_at,
        }
    }

    /// Tear the session down.
    pub fn finish(self) -> SessionSummary {
        self.summary()
    }

    fn advance(&mut self, reviewed: Option<Card>) -> SessionStep {
        self.index += 1;
        match self.cards.get(self.index) {
            Some(next) => SessionStep::Next {
                reviewed,
                next: next.clone(),
                position: self.index + 1,
                total: self.cards.len(),
            },
            None => SessionStep::Complete {
                reviewed,
                summary: self.summary(),
            },
        }
    }
}
