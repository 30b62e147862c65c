//! Card storage boundary.
//!
//! The repository traits describe what the scheduling core needs from
//! persistent storage. `MemoryStore` is the in-process implementation used by
//! the tests and by the backend when no database is configured.
//!
//! Memory state is only ever written through [`ReviewRepository::review_card`],
//! which reads, schedules and writes back while holding the store lock. Two
//! reviews of the same card therefore apply one after the other and neither
//! is lost.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::algorithm::Sm2;
use crate::due::select_due;
use crate::error::StoreError;
use crate::types::{Card, Deck, MemoryState, Quality};

type Result<T> = std::result::Result<T, StoreError>;

/// Repository for deck operations.
pub trait DeckRepository {
    fn create_deck(&self, name: &str, now: DateTime<Utc>) -> Result<Deck>;
    fn get_deck(&self, id: i64) -> Result<Option<Deck>>;
    fn list_decks(&self) -> Result<Vec<Deck>>;
    /// Deletes the deck and every card in it.
    fn delete_deck(&self, id: i64) -> Result<()>;
}

/// Repository for card operations.
pub trait CardRepository {
    fn add_card(&self, deck_id: i64, question: &str, answer: &str, now: DateTime<Utc>) -> Result<Card>;
    fn add_cards(&self, deck_id: i64, cards: &[(String, String)], now: DateTime<Utc>) -> Result<Vec<Card>>;
    fn get_card(&self, id: i64) -> Result<Option<Card>>;
    /// Cards of one deck in creation order.
    fn cards_in_deck(&self, deck_id: i64) -> Result<Vec<Card>>;
    fn all_cards(&self) -> Result<Vec<Card>>;
    /// Replaces question and answer; memory state is left untouched.
    fn update_card_text(&self, id: i64, question: &str, answer: &str) -> Result<Card>;
    fn delete_card(&self, id: i64) -> Result<()>;
    /// Due set of one deck, most overdue first.
    fn due_cards(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<Card>>;
}

/// Repository for the review update.
pub trait ReviewRepository {
    /// Atomically schedule a review of `card_id` and persist the new state.
    fn review_card(&self, card_id: i64, quality: Quality, now: DateTime<Utc>, sm2: &Sm2) -> Result<Card>;
}

/// Everything the backend needs from storage.
pub trait Store: DeckRepository + CardRepository + ReviewRepository + Send + Sync {}

impl<T> Store for T where T: DeckRepository + CardRepository + ReviewRepository + Send + Sync {}

#[derive(Debug, Default)]
struct Inner {
    decks: BTreeMap<i64, Deck>,
    cards: BTreeMap<i64, Card>,
    last_deck_id: i64,
    last_card_id: i64,
}

impl Inner {
    fn require_deck(&self, deck_id: i64) -> Result<()> {
        if self.decks.contains_key(&deck_id) {
            Ok(())
        } else {
            Err(StoreError::DeckNotFound(deck_id))
        }
    }

    fn insert_card(&mut self, deck_id: i64, question: String, answer: String, now: DateTime<Utc>) -> Card {
        self.last_card_id += 1;
        let card = Card {
            id: self.last_card_id,
            deck_id,
            question,
            answer,
            state: MemoryState::new(now),
            created_at: now,
        };
        self.cards.insert(card.id, card.clone());
        card
    }

    fn deck_cards(&self, deck_id: i64) -> impl Iterator<Item = &Card> {
        self.cards.values().filter(move |card| card.deck_id == deck_id)
    }
}

/// In-memory store guarded by a single mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Trimmed `value`, or [`StoreError::EmptyField`] when it is blank.
pub fn non_empty(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StoreError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

impl DeckRepository for MemoryStore {
    fn create_deck(&self, name: &str, now: DateTime<Utc>) -> Result<Deck> {
        let name = non_empty(name, "deck name")?;
        let mut inner = self.lock()?;
        if inner.decks.values().any(|deck| deck.name == name) {
            return Err(StoreError::DuplicateDeck(name));
        }
        inner.last_deck_id += 1;
        let deck = Deck {
            id: inner.last_deck_id,
            name,
            created_at: now,
        };
        inner.decks.insert(deck.id, deck.clone());
        Ok(deck)
    }

    fn get_deck(&self, id: i64) -> Result<Option<Deck>> {
        Ok(self.lock()?.decks.get(&id).cloned())
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut decks: Vec<Deck> = self.lock()?.decks.values().cloned().collect();
        decks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(decks)
    }

    fn delete_deck(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        inner.decks.remove(&id).ok_or(StoreError::DeckNotFound(id))?;
        inner.cards.retain(|_, card| card.deck_id != id);
        Ok(())
    }
}

impl CardRepository for MemoryStore {
    fn add_card(&self, deck_id: i64, question: &str, answer: &str, now: DateTime<Utc>) -> Result<Card> {
        let question = non_empty(question, "question")?;
        let answer = non_empty(answer, "answer")?;
        let mut inner = self.lock()?;
        inner.require_deck(deck_id)?;
        Ok(inner.insert_card(deck_id, question, answer, now))
    }

    fn add_cards(&self, deck_id: i64, cards: &[(String, String)], now: DateTime<Utc>) -> Result<Vec<Card>> {
        // Validate everything before inserting anything.
        let cards = cards
            .iter()
            .map(|(question, answer)| -> Result<(String, String)> {
                Ok((non_empty(question, "question")?, non_empty(answer, "answer")?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut inner = self.lock()?;
        inner.require_deck(deck_id)?;
        Ok(cards
            .into_iter()
            .map(|(question, answer)| inner.insert_card(deck_id, question, answer, now))
            .collect())
    }

    fn get_card(&self, id: i64) -> Result<Option<Card>> {
        Ok(self.lock()?.cards.get(&id).cloned())
    }

    fn cards_in_deck(&self, deck_id: i64) -> Result<Vec<Card>> {
        let inner = self.lock()?;
        inner.require_deck(deck_id)?;
        Ok(inner.deck_cards(deck_id).cloned().collect())
    }

    fn all_cards(&self) -> Result<Vec<Card>> {
        Ok(self.lock()?.cards.values().cloned().collect())
    }

    fn update_card_text(&self, id: i64, question: &str, answer: &str) -> Result<Card> {
        let question = non_empty(question, "question")?;
        let answer = non_empty(answer, "answer")?;
        let mut inner = self.lock()?;
        let card = inner.cards.get_mut(&id).ok_or(StoreError::CardNotFound(id))?;
        card.question = question;
        card.answer = answer;
        Ok(card.clone())
    }

    fn delete_card(&self, id: i64) -> Result<()> {
        self.lock()?
            .cards
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::CardNotFound(id))
    }

    fn due_cards(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<Card>> {
        let inner = self.lock()?;
        inner.require_deck(deck_id)?;
        Ok(select_due(inner.deck_cards(deck_id), now)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl ReviewRepository for MemoryStore {
    fn review_card(&self, card_id: i64, quality: Quality, now: DateTime<Utc>, sm2: &Sm2) -> Result<Card> {
        let mut inner = self.lock()?;
        let card = inner
            .cards
            .get_mut(&card_id)
            .ok_or(StoreError::CardNotFound(card_id))?;
        card.state = sm2.schedule(&card.state, quality, now)?;
        Ok(card.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn store_with_deck() -> (MemoryStore, Deck) {
        let store = MemoryStore::new();
        let deck = store.create_deck("Rust", now()).unwrap();
        (store, deck)
    }

    #[test]
    fn new_cards_start_due_with_default_state() {
        let (store, deck) = store_with_deck();
        let card = store.add_card(deck.id, "What is a borrow?", "A reference.", now()).unwrap();
        assert_eq!(card.state, MemoryState::new(now()));
        assert_eq!(store.due_cards(deck.id, now()).unwrap(), vec![card]);
    }

    #[test]
    fn deck_names_are_unique_and_non_empty() {
        let (store, _) = store_with_deck();
        assert!(matches!(
            store.create_deck(" Rust ", now()),
            Err(StoreError::DuplicateDeck(name)) if name == "Rust"
        ));
        assert!(matches!(store.create_deck("   ", now()), Err(StoreError::EmptyField(_))));
    }

    #[test]
    fn decks_are_listed_by_name() {
        let store = MemoryStore::new();
        store.create_deck("Spanish", now()).unwrap();
        store.create_deck("Biology", now()).unwrap();
        let names: Vec<String> = store.list_decks().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Biology".to_string(), "Spanish".to_string()]);
    }

    #[test]
    fn adding_to_missing_deck_fails() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add_card(42, "Q", "A", now()),
            Err(StoreError::DeckNotFound(42))
        ));
    }

    #[test]
    fn bulk_add_is_all_or_nothing() {
        let (store, deck) = store_with_deck();
        let cards = vec![
            ("Q1".to_string(), "A1".to_string()),
            ("Q2".to_string(), " ".to_string()),
        ];
        assert!(store.add_cards(deck.id, &cards, now()).is_err());
        assert!(store.cards_in_deck(deck.id).unwrap().is_empty());

        let cards = vec![
            ("Q1".to_string(), "A1".to_string()),
            ("Q2".to_string(), "A2".to_string()),
        ];
        let added = store.add_cards(deck.id, &cards, now()).unwrap();
        assert_eq!(added.len(), 2);
        assert!(added[0].id < added[1].id);
    }

    #[test]
    fn editing_text_keeps_memory_state() {
        let (store, deck) = store_with_deck();
        let card = store.add_card(deck.id, "Q", "A", now()).unwrap();
        let reviewed = store
            .review_card(card.id, Rating::Good.quality(), now(), &Sm2::default())
            .unwrap();
        let edited = store.update_card_text(card.id, "New Q", "New A").unwrap();
        assert_eq!(edited.question, "New Q");
        assert_eq!(edited.state, reviewed.state);
    }

    #[test]
    fn deleting_deck_removes_its_cards() {
        let (store, deck) = store_with_deck();
        let other = store.create_deck("Other", now()).unwrap();
        store.add_card(deck.id, "Q", "A", now()).unwrap();
        let kept = store.add_card(other.id, "Q", "A", now()).unwrap();
        store.delete_deck(deck.id).unwrap();
        assert_eq!(store.all_cards().unwrap(), vec![kept]);
        assert!(matches!(store.due_cards(deck.id, now()), Err(StoreError::DeckNotFound(_))));
    }

    #[test]
    fn delete_missing_card_fails() {
        let store = MemoryStore::new();
        assert!(matches!(store.delete_card(3), Err(StoreError::CardNotFound(3))));
    }

    #[test]
    fn review_moves_card_out_of_due_set() {
        let (store, deck) = store_with_deck();
        let first = store.add_card(deck.id, "Q1", "A1", now()).unwrap();
        let second = store.add_card(deck.id, "Q2", "A2", now()).unwrap();

        let reviewed = store
            .review_card(first.id, Rating::Good.quality(), now(), &Sm2::default())
            .unwrap();
        assert_eq!(reviewed.state.next_review, now() + Duration::days(1));

        let due: Vec<i64> = store.due_cards(deck.id, now()).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(due, vec![second.id]);

        let tomorrow: Vec<i64> = store
            .due_cards(deck.id, now() + Duration::days(1))
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(tomorrow, vec![second.id, first.id]);
    }

    #[test]
    fn concurrent_reviews_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let deck = store.create_deck("Shared", now()).unwrap();
        let card_id = store.add_card(deck.id, "Q", "A", now()).unwrap().id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .review_card(card_id, Rating::Good.quality(), now(), &Sm2::default())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let card = store.get_card(card_id).unwrap().unwrap();
        assert_eq!(card.state.repetitions, 8);
        assert!((card.state.easiness_factor - 3.3).abs() < 1e-9);
    }

    #[test]
    fn reviewing_missing_card_fails() {
        let store = MemoryStore::new();
        let result = store.review_card(9, Rating::Again.quality(), now(), &Sm2::default());
        assert!(matches!(result, Err(StoreError::CardNotFound(9))));
    }
}
