//! Due-set selection.

use chrono::{DateTime, Utc};

use crate::types::Card;

pub fn is_due(card: &Card, now: DateTime<Utc>) -> bool {
    card.state.next_review <= now
}

/// Cards whose review time has arrived, most overdue first.
///
/// Cards due at the same instant keep their relative input order, so passing
/// cards in creation order breaks ties by creation order.
pub fn select_due<'a, I>(cards: I, now: DateTime<Utc>) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut due: Vec<&Card> = cards.into_iter().filter(|card| is_due(card, now)).collect();
    due.sort_by_key(|card| card.state.next_review);
    due
}

pub fn due_count<'a, I>(cards: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a Card>,
{
    cards.into_iter().filter(|card| is_due(card, now)).count()
}
