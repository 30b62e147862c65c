//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use recall_core::stats::{easiness_distribution, interval_distribution, upcoming_reviews};
use recall_core::{CardRepository, DeckRepository};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

const DEFAULT_UPCOMING_DAYS: u32 = 7;
const MAX_UPCOMING_DAYS: u32 = 365;

fn selected_cards(state: &AppState, deck_id: Option<i64>) -> Result<Vec<Card>> {
    Ok(match deck_id {
        Some(deck_id) => state.store.cards_in_deck(deck_id)?,
        None => state.store.all_cards()?,
    })
}

/// GET /api/stats
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let now = Utc::now();
    let cards = selected_cards(&state, query.deck_id)?;

    let decks = state
        .store
        .list_decks()?
        .into_iter()
        .filter(|deck| query.deck_id.map_or(true, |id| id == deck.id))
        .map(|deck| {
            let deck_cards: Vec<Card> = cards.iter().filter(|c| c.deck_id == deck.id).cloned().collect();
            DeckSummary::compute(&deck, &deck_cards, now)
        })
        .collect();

    Ok(Json(StatsResponse {
        overview: StudyStats::compute(&cards, now),
        retention: RetentionMetrics::compute(&cards),
        numerical: NumericalStats::compute(&cards),
        correlations: Correlations::compute(&cards),
        decks,
    }))
}

/// GET /api/stats/intervals
pub async fn intervals(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DistributionResponse>> {
    let cards = selected_cards(&state, query.deck_id)?;
    Ok(Json(DistributionResponse {
        buckets: interval_distribution(&cards),
    }))
}

/// GET /api/stats/easiness
pub async fn easiness(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DistributionResponse>> {
    let cards = selected_cards(&state, query.deck_id)?;
    Ok(Json(DistributionResponse {
        buckets: easiness_distribution(&cards),
    }))
}

/// GET /api/stats/upcoming
pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<UpcomingResponse>> {
    let days = query.days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    if days == 0 || days > MAX_UPCOMING_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_UPCOMING_DAYS}"
        )));
    }
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let cards = state.store.all_cards()?;
    Ok(Json(UpcomingResponse {
        days: upcoming_reviews(&cards, from, days)?,
    }))
}
