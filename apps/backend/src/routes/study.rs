//! Study session endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use recall_core::{CardRepository, SessionStep, StudySession};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::parse_rating;
use crate::services::events::SessionEvent;
use crate::AppState;

fn session_not_found(session_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Study session {session_id}"))
}

fn session_response(session_id: Uuid, session: &StudySession) -> SessionResponse {
    SessionResponse {
        session_id,
        deck_id: session.deck_id(),
        card: session.current().cloned(),
        current: session.position(),
        total: session.total(),
        reviewed: session.reviewed(),
    }
}

/// POST /api/study/sessions
pub async fn start(
    State(state): State<AppState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionResponse>> {
    let now = payload.at.unwrap_or_else(Utc::now);
    let due = state.store.due_cards(payload.deck_id, now)?;
    let session = StudySession::start(payload.deck_id, due, now)?;
    let total = session.total();
    let response_session = session.clone();
    let (session_id, replaced) = state.sessions.insert(session).await;

    if let Some((replaced_id, old)) = replaced {
        tracing::debug!(%replaced_id, deck_id = payload.deck_id, "replacing study session");
        state.events.publish(SessionEvent::Ended {
            session_id: replaced_id,
            summary: old.finish(),
        });
    }

    state.events.publish(SessionEvent::Started {
        session_id,
        deck_id: payload.deck_id,
        total,
        timestamp: now,
    });

    Ok(Json(session_response(session_id, &response_session)))
}

/// GET /api/study/sessions/:id
pub async fn current(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    state
        .sessions
        .with_session(session_id, |session| session_response(session_id, session))
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(session_id))
}

/// POST /api/study/sessions/:id/rate
pub async fn rate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<RateResponse>> {
    let rating = parse_rating(&payload.rating)?;
    let now = payload.reviewed_at.unwrap_or_else(Utc::now);

    let step = state
        .sessions
        .with_session(session_id, |session| {
            session.rate(state.store.as_ref(), rating, &state.sm2, now)
        })
        .await
        .ok_or_else(|| session_not_found(session_id))??;

    let reviewed = match &step {
        SessionStep::Next { reviewed, .. } | SessionStep::Complete { reviewed, .. } => reviewed,
    };
    if let Some(card) = reviewed {
        state.events.publish(SessionEvent::CardRated {
            session_id,
            card_id: card.id,
            rating,
            interval: card.state.interval,
            next_review: card.state.next_review,
        });
    }

    Ok(Json(step_response(&state, session_id, step).await))
}

/// POST /api/study/sessions/:id/skip
pub async fn skip(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<RateResponse>> {
    let step = state
        .sessions
        .with_session(session_id, |session| session.skip())
        .await
        .ok_or_else(|| session_not_found(session_id))??;

    Ok(Json(step_response(&state, session_id, step).await))
}

/// DELETE /api/study/sessions/:id
pub async fn end(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<EndSessionResponse>> {
    let session = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let summary = session.finish();

    state.events.publish(SessionEvent::Ended {
        session_id,
        summary: summary.clone(),
    });

    Ok(Json(EndSessionResponse { summary }))
}

/// Build the response for a step, tearing the session down once it is done.
async fn step_response(state: &AppState, session_id: Uuid, step: SessionStep) -> RateResponse {
    match step {
        SessionStep::Next {
            reviewed,
            next,
            position,
            total,
        } => RateResponse {
            session_id,
            reviewed,
            next_card: Some(next),
            current: position,
            total,
            session_complete: false,
            summary: None,
        },
        SessionStep::Complete { reviewed, summary } => {
            state.sessions.remove(session_id).await;
            state.events.publish(SessionEvent::Completed {
                session_id,
                summary: summary.clone(),
            });
            RateResponse {
                session_id,
                reviewed,
                next_card: None,
                current: summary.total,
                total: summary.total,
                session_complete: true,
                summary: Some(summary),
            }
        }
    }
}
