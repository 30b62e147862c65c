//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from recall-core
pub use recall_core::{
    Bucket, Card, Correlations, DailyCount, Deck, DeckSummary, MemoryState, NumericalStats, Rating,
    RetentionMetrics, SessionSummary, StudyStats,
};

// Deck types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeckDetailResponse {
    pub deck: Deck,
    pub cards: Vec<Card>,
    pub stats: StudyStats,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DueCardsQuery {
    /// Reference time; defaults to now.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct DueCardsResponse {
    pub deck_id: i64,
    pub count: usize,
    pub cards: Vec<Card>,
}

// Card types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCardsRequest {
    pub cards: Vec<NewCard>,
}

#[derive(Debug, Serialize)]
pub struct AddCardsResponse {
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub question: String,
    pub answer: String,
}

// Study types
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// One of again, hard, good, easy.
    pub rating: String,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub card: Card,
    pub rating: Rating,
    pub quality: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub deck_id: i64,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub deck_id: i64,
    pub card: Option<Card>,
    pub current: usize,
    pub total: usize,
    pub reviewed: usize,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub session_id: Uuid,
    pub reviewed: Option<Card>,
    pub next_card: Option<Card>,
    pub current: usize,
    pub total: usize,
    pub session_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub summary: SessionSummary,
}

// Stats types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    pub deck_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub overview: StudyStats,
    pub retention: RetentionMetrics,
    pub numerical: NumericalStats,
    pub correlations: Correlations,
    pub decks: Vec<DeckSummary>,
}

#[derive(Debug, Serialize)]
pub struct DistributionResponse {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<u32>,
    pub from: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct UpcomingResponse {
    pub days: Vec<DailyCount>,
}
