//! Deck endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use recall_core::{CardRepository, DeckRepository};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/decks
pub async fn list(State(state): State<AppState>) -> Result<Json<DeckListResponse>> {
    let now = Utc::now();
    let decks = state
        .store
        .list_decks()?
        .iter()
        .map(|deck| -> Result<DeckSummary> {
            let cards = state.store.cards_in_deck(deck.id)?;
            Ok(DeckSummary::compute(deck, &cards, now))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(DeckListResponse { decks }))
}

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<Deck>)> {
    let deck = state.store.create_deck(&payload.name, Utc::now())?;
    tracing::info!(deck_id = deck.id, name = %deck.name, "created deck");
    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET /api/decks/:id
pub async fn get(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckDetailResponse>> {
    let deck = state
        .store
        .get_deck(deck_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {deck_id}")))?;
    let cards = state.store.cards_in_deck(deck_id)?;
    let stats = StudyStats::compute(&cards, Utc::now());
    Ok(Json(DeckDetailResponse { deck, cards, stats }))
}

/// DELETE /api/decks/:id
pub async fn delete(State(state): State<AppState>, Path(deck_id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_deck(deck_id)?;
    tracing::info!(deck_id, "deleted deck");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/decks/:id/due
pub async fn due(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
    Query(query): Query<DueCardsQuery>,
) -> Result<Json<DueCardsResponse>> {
    let now = query.at.unwrap_or_else(Utc::now);
    let cards = state.store.due_cards(deck_id, now)?;
    Ok(Json(DueCardsResponse {
        deck_id,
        count: cards.len(),
        cards,
    }))
}
