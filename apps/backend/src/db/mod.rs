//! SQLite persistence for decks and cards.

pub mod repository;
pub mod schema;

pub use repository::SqliteStore;
