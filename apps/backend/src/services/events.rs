//! Study session events.
//!
//! Session lifecycle changes are published on a tokio broadcast channel so
//! other parts of the application can react to them without holding a
//! reference to the session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use recall_core::{Rating, SessionSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    Started {
        session_id: Uuid,
        deck_id: i64,
        total: usize,
        timestamp: DateTime<Utc>,
    },
    CardRated {
        session_id: Uuid,
        card_id: i64,
        rating: Rating,
        interval: u32,
        next_review: DateTime<Utc>,
    },
    Completed {
        session_id: Uuid,
        summary: SessionSummary,
    },
    Ended {
        session_id: Uuid,
        summary: SessionSummary,
    },
}

/// Broadcast sender shared through the application state.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

/// Log every event until the bus is dropped.
pub fn spawn_logger(mut receiver: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(SessionEvent::Started { session_id, deck_id, total, .. }) => {
                    tracing::info!(%session_id, deck_id, total, "study session started");
                }
                Ok(SessionEvent::CardRated { session_id, card_id, rating, interval, .. }) => {
                    tracing::debug!(%session_id, card_id, %rating, interval, "card rated");
                }
                Ok(SessionEvent::Completed { session_id, summary }) => {
                    tracing::info!(%session_id, reviewed = summary.reviewed, lapses = summary.lapses, "study session completed");
                }
                Ok(SessionEvent::Ended { session_id, summary }) => {
                    tracing::info!(%session_id, reviewed = summary.reviewed, total = summary.total, "study session ended");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
