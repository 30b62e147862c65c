//! Card endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use recall_core::{CardRepository, ReviewRepository};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::parse_rating;
use crate::AppState;

/// POST /api/decks/:id/cards
pub async fn add(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
    Json(payload): Json<AddCardsRequest>,
) -> Result<(StatusCode, Json<AddCardsResponse>)> {
    if payload.cards.is_empty() {
        return Err(ApiError::BadRequest("No cards given".to_string()));
    }
    let pairs: Vec<(String, String)> = payload
        .cards
        .into_iter()
        .map(|card| (card.question, card.answer))
        .collect();
    let cards = state.store.add_cards(deck_id, &pairs, Utc::now())?;
    tracing::info!(deck_id, count = cards.len(), "added cards");
    Ok((StatusCode::CREATED, Json(AddCardsResponse { cards })))
}

/// GET /api/cards/:id
pub async fn get(State(state): State<AppState>, Path(card_id): Path<i64>) -> Result<Json<Card>> {
    state
        .store
        .get_card(card_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Card {card_id}")))
}

/// PUT /api/cards/:id
pub async fn update(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    let card = state
        .store
        .update_card_text(card_id, &payload.question, &payload.answer)?;
    Ok(Json(card))
}

/// DELETE /api/cards/:id
pub async fn delete(State(state): State<AppState>, Path(card_id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_card(card_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cards/:id/review
pub async fn review(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let rating = parse_rating(&payload.rating)?;
    let now = payload.reviewed_at.unwrap_or_else(Utc::now);
    let card = state
        .store
        .review_card(card_id, rating.quality(), now, &state.sm2)?;

    tracing::debug!(
        card_id,
        %rating,
        interval = card.state.interval,
        easiness = card.state.easiness_factor,
        "reviewed card"
    );

    Ok(Json(ReviewResponse {
        card,
        rating,
        quality: rating.quality().value(),
    }))
}
