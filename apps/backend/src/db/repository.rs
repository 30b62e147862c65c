//! SQLite implementation of the card store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use recall_core::store::non_empty;
use recall_core::{
    select_due, Card, CardRepository, Deck, DeckRepository, MemoryState, Quality,
    ReviewRepository, Sm2, StoreError,
};

type Result<T> = std::result::Result<T, StoreError>;

const CARD_COLUMNS: &str =
    "id, deck_id, question, answer, easiness_factor, interval, repetitions, next_review, created_at";

fn storage(err: rusqlite::Error) -> StoreError {
    StoreError::Storage(Box::new(err))
}

/// SQLite store. The connection sits behind a mutex, so a review reads and
/// writes its card inside one transaction with no other writer in between.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::initialize(Connection::open(path).map_err(storage)?)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory().map_err(storage)?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(super::schema::SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_deck(row: &Row) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp(row, 2)?,
    })
}

fn row_to_card(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        state: MemoryState {
            easiness_factor: row.get(4)?,
            interval: row.get(5)?,
            repetitions: row.get(6)?,
            next_review: timestamp(row, 7)?,
        },
        created_at: timestamp(row, 8)?,
    })
}

fn query_cards<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Card>> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards {filter} ORDER BY id");
    let mut stmt = conn.prepare(&sql).map_err(storage)?;
    let cards = stmt
        .query_map(params, row_to_card)
        .map_err(storage)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(storage)?;
    Ok(cards)
}

fn select_card(conn: &Connection, id: i64) -> Result<Option<Card>> {
    conn.query_row(
        &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
        params![id],
        row_to_card,
    )
    .optional()
    .map_err(storage)
}

fn require_deck(conn: &Connection, deck_id: i64) -> Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1)",
            params![deck_id],
            |row| row.get(0),
        )
        .map_err(storage)?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::DeckNotFound(deck_id))
    }
}

fn insert_card(conn: &Connection, deck_id: i64, question: String, answer: String, now: DateTime<Utc>) -> Result<Card> {
    let state = MemoryState::new(now);
    conn.execute(
        "INSERT INTO cards (deck_id, question, answer, easiness_factor, interval, repetitions, next_review, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            deck_id,
            question,
            answer,
            state.easiness_factor,
            state.interval,
            state.repetitions,
            state.next_review.to_rfc3339(),
            now.to_rfc3339()
        ],
    )
    .map_err(storage)?;

    Ok(Card {
        id: conn.last_insert_rowid(),
        deck_id,
        question,
        answer,
        state,
        created_at: now,
    })
}

impl DeckRepository for SqliteStore {
    fn create_deck(&self, name: &str, now: DateTime<Utc>) -> Result<Deck> {
        let name = non_empty(name, "deck name")?;
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM decks WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )
            .map_err(storage)?;
        if exists {
            return Err(StoreError::DuplicateDeck(name));
        }

        conn.execute(
            "INSERT INTO decks (name, created_at) VALUES (?1, ?2)",
            params![name, now.to_rfc3339()],
        )
        .map_err(storage)?;

        Ok(Deck {
            id: conn.last_insert_rowid(),
            name,
            created_at: now,
        })
    }

    fn get_deck(&self, id: i64) -> Result<Option<Deck>> {
        self.lock()?
            .query_row(
                "SELECT id, name, created_at FROM decks WHERE id = ?1",
                params![id],
                row_to_deck,
            )
            .optional()
            .map_err(storage)
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, created_at FROM decks ORDER BY name")
            .map_err(storage)?;
        let decks = stmt
            .query_map([], row_to_deck)
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;
        Ok(decks)
    }

    fn delete_deck(&self, id: i64) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        tx.execute("DELETE FROM cards WHERE deck_id = ?1", params![id])
            .map_err(storage)?;
        let deleted = tx
            .execute("DELETE FROM decks WHERE id = ?1", params![id])
            .map_err(storage)?;
        if deleted == 0 {
            return Err(StoreError::DeckNotFound(id));
        }
        tx.commit().map_err(storage)
    }
}

impl CardRepository for SqliteStore {
    fn add_card(&self, deck_id: i64, question: &str, answer: &str, now: DateTime<Utc>) -> Result<Card> {
        let question = non_empty(question, "question")?;
        let answer = non_empty(answer, "answer")?;
        let conn = self.lock()?;
        require_deck(&conn, deck_id)?;
        insert_card(&conn, deck_id, question, answer, now)
    }

    fn add_cards(&self, deck_id: i64, cards: &[(String, String)], now: DateTime<Utc>) -> Result<Vec<Card>> {
        let cards = cards
            .iter()
            .map(|(question, answer)| -> Result<(String, String)> {
                Ok((non_empty(question, "question")?, non_empty(answer, "answer")?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        require_deck(&tx, deck_id)?;
        let inserted = cards
            .into_iter()
            .map(|(question, answer)| insert_card(&tx, deck_id, question, answer, now))
            .collect::<Result<Vec<_>>>()?;
        tx.commit().map_err(storage)?;
        Ok(inserted)
    }

    fn get_card(&self, id: i64) -> Result<Option<Card>> {
        select_card(&*self.lock()?, id)
    }

    fn cards_in_deck(&self, deck_id: i64) -> Result<Vec<Card>> {
        let conn = self.lock()?;
        require_deck(&conn, deck_id)?;
        query_cards(&conn, "WHERE deck_id = ?1", params![deck_id])
    }

    fn all_cards(&self) -> Result<Vec<Card>> {
        query_cards(&*self.lock()?, "", [])
    }

    fn update_card_text(&self, id: i64, question: &str, answer: &str) -> Result<Card> {
        let question = non_empty(question, "question")?;
        let answer = non_empty(answer, "answer")?;
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE cards SET question = ?1, answer = ?2 WHERE id = ?3",
                params![question, answer, id],
            )
            .map_err(storage)?;
        if updated == 0 {
            return Err(StoreError::CardNotFound(id));
        }
        select_card(&conn, id)?.ok_or(StoreError::CardNotFound(id))
    }

    fn delete_card(&self, id: i64) -> Result<()> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM cards WHERE id = ?1", params![id])
            .map_err(storage)?;
        if deleted == 0 {
            Err(StoreError::CardNotFound(id))
        } else {
            Ok(())
        }
    }

    fn due_cards(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<Card>> {
        let cards = self.cards_in_deck(deck_id)?;
        Ok(select_due(&cards, now).into_iter().cloned().collect())
    }
}

impl ReviewRepository for SqliteStore {
    fn review_card(&self, card_id: i64, quality: Quality, now: DateTime<Utc>, sm2: &Sm2) -> Result<Card> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage)?;
        let mut card = select_card(&tx, card_id)?.ok_or(StoreError::CardNotFound(card_id))?;
        card.state = sm2.schedule(&card.state, quality, now)?;

        tx.execute(
            "UPDATE cards SET easiness_factor = ?1, interval = ?2, repetitions = ?3, next_review = ?4 WHERE id = ?5",
            params![
                card.state.easiness_factor,
                card.state.interval,
                card.state.repetitions,
                card.state.next_review.to_rfc3339(),
                card_id
            ],
        )
        .map_err(storage)?;
        tx.commit().map_err(storage)?;
        Ok(card)
    }
}
