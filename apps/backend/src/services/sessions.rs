//! Registry of active study sessions.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use recall_core::StudySession;

/// Sessions addressed by handle. Each request names the session it acts on.
///
/// A deck has at most one active session; starting another replaces it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, StudySession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session`, returning its handle and the session it displaced.
    pub async fn insert(&self, session: StudySession) -> (Uuid, Option<(Uuid, StudySession)>) {
        let mut sessions = self.sessions.write().await;
        let previous_id = sessions
            .iter()
            .find(|(_, active)| active.deck_id() == session.deck_id())
            .map(|(id, _)| *id);
        let replaced = previous_id.and_then(|id| sessions.remove(&id).map(|old| (id, old)));

        let id = Uuid::new_v4();
        sessions.insert(id, session);
        (id, replaced)
    }

    /// Run `f` against the session with exclusive access.
    pub async fn with_session<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut StudySession) -> R,
    {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) -> Option<StudySession> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recall_core::{Card, MemoryState};

    fn session(deck_id: i64) -> StudySession {
        let now = Utc::now();
        let card = Card {
            id: 1,
            deck_id,
            question: "Q".to_string(),
            answer: "A".to_string(),
            state: MemoryState::new(now),
            created_at: now,
        };
        StudySession::start(deck_id, vec![card], now).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let registry = SessionRegistry::new();
        let (id, replaced) = registry.insert(session(1)).await;
        assert!(replaced.is_none());
        assert_eq!(registry.len().await, 1);

        let total = registry.with_session(id, |s| s.total()).await;
        assert_eq!(total, Some(1));

        assert!(registry.remove(id).await.is_some());
        assert!(registry.is_empty().await);
        assert!(registry.with_session(id, |s| s.total()).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let (first, _) = registry.insert(session(1)).await;
        let (second, replaced) = registry.insert(session(2)).await;
        assert!(replaced.is_none());
        assert_ne!(first, second);

        registry.with_session(first, |s| s.skip().unwrap()).await;
        assert_eq!(registry.with_session(first, |s| s.is_complete()).await, Some(true));
        assert_eq!(registry.with_session(second, |s| s.is_complete()).await, Some(false));
    }

    #[tokio::test]
    async fn test_restart_replaces_session_for_same_deck() {
        let registry = SessionRegistry::new();
        let (first, _) = registry.insert(session(1)).await;
        registry.insert(session(2)).await;

        for _ in 0..50 {
            registry.insert(session(1)).await;
        }
        assert_eq!(registry.len().await, 2);
        assert!(registry.with_session(first, |s| s.total()).await.is_none());

        let (latest, replaced) = registry.insert(session(1)).await;
        let (replaced_id, old) = replaced.unwrap();
        assert_ne!(replaced_id, latest);
        assert_eq!(old.deck_id(), 1);
    }
}
