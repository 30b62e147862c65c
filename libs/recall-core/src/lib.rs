//! Spaced repetition core shared by the backend.
//!
//! Provides:
//! - Rating to quality mapping
//! - SM-2 review scheduling
//! - Due-set selection
//! - The card store boundary with an in-memory implementation
//! - Explicit study sessions
//! - Study statistics

pub mod algorithm;
pub mod due;
pub mod error;
pub mod rating;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

pub use algorithm::{advance, Sm2};
pub use due::{due_count, is_due, select_due};
pub use error::{Result, ScheduleError, SessionError, StoreError};
pub use rating::quality_of;
pub use session::{SessionStep, SessionSummary, StudySession};
pub use stats::{
    Bucket, Correlations, DailyCount, DeckSummary, NumericalStats, RetentionMetrics, StudyStats,
};
pub use store::{CardRepository, DeckRepository, MemoryStore, ReviewRepository, Store};
pub use types::{Card, Deck, MemoryState, Quality, Rating, INITIAL_EASINESS, MINIMUM_EASINESS};
