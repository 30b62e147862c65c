//! Common test utilities and fixtures for integration tests.
//!
//! Every test gets its own store, in memory unless the test opens a SQLite
//! file, so tests do not share state and need no external services.

#![allow(dead_code)]

pub mod fixtures;

use axum::http::StatusCode;
use axum_test::TestServer;

use recall_backend::config::Config;
use recall_backend::{router, AppState};

/// Test context holding the application state and a test server.
pub struct TestContext {
    pub state: AppState,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_state(AppState::new(&Config::default()))
    }

    pub fn with_state(state: AppState) -> Self {
        let server = TestServer::new(router(state.clone())).expect("failed to start test server");
        Self { state, server }
    }

    /// Create a deck through the API and return its id.
    pub async fn create_deck(&self, name: &str) -> i64 {
        let response = self
            .server
            .post("/api/decks")
            .json(&fixtures::create_deck_request(name))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["id"]
            .as_i64()
            .expect("deck id")
    }

    /// Add `count` generated cards to a deck and return their ids.
    pub async fn add_cards(&self, deck_id: i64, count: usize) -> Vec<i64> {
        let response = self
            .server
            .post(&format!("/api/decks/{deck_id}/cards"))
            .json(&fixtures::sample_cards(count))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["cards"]
            .as_array()
            .expect("cards array")
            .iter()
            .map(|card| card["id"].as_i64().expect("card id"))
            .collect()
    }
}
