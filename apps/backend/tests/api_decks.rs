//! Deck and card API tests.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = ctx.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_deck_list_empty() {
    let ctx = TestContext::new();
    let response = ctx.server.get("/api/decks").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["decks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_and_list_decks() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Rust").await;
    ctx.add_cards(deck_id, 3).await;

    let response = ctx.server.get("/api/decks").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let decks = body["decks"].as_array().unwrap();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0]["name"], "Rust");
    assert_eq!(decks[0]["total_cards"], 3);
    assert_eq!(decks[0]["due_cards"], 3);
    assert_eq!(decks[0]["studied_cards"], 0);
}

#[tokio::test]
async fn test_duplicate_deck_conflicts() {
    let ctx = TestContext::new();
    ctx.create_deck("Rust").await;

    let response = ctx
        .server
        .post("/api/decks")
        .json(&fixtures::create_deck_request("Rust"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_blank_deck_name_rejected() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/decks")
        .json(&fixtures::create_deck_request("   "))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_deck_with_cards() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Biology").await;
    let card_ids = ctx.add_cards(deck_id, 2).await;

    let response = ctx.server.get(&format!("/api/decks/{deck_id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deck"]["name"], "Biology");
    let ids: Vec<i64> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, card_ids);
    assert_eq!(body["cards"][0]["easiness_factor"], 2.5);
    assert_eq!(body["cards"][0]["interval"], 0);
    assert_eq!(body["cards"][0]["repetitions"], 0);
    assert_eq!(body["stats"]["total_cards"], 2);
}

#[tokio::test]
async fn test_get_missing_deck() {
    let ctx = TestContext::new();
    let response = ctx.server.get("/api/decks/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_deck_removes_cards() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Temporary").await;
    let card_ids = ctx.add_cards(deck_id, 2).await;

    let response = ctx.server.delete(&format!("/api/decks/{deck_id}")).await;
    response.assert_status(StatusCode::NO_CONTENT);

    ctx.server
        .get(&format!("/api/decks/{deck_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.server
        .get(&format!("/api/cards/{}", card_ids[0]))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_cards_to_missing_deck() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/decks/42/cards")
        .json(&fixtures::sample_cards(1))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_no_cards_rejected() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Empty").await;
    let response = ctx
        .server
        .post(&format!("/api/decks/{deck_id}/cards"))
        .json(&fixtures::sample_cards(0))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_edit_card_keeps_schedule() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Spanish").await;
    let card_id = ctx.add_cards(deck_id, 1).await[0];

    ctx.server
        .post(&format!("/api/cards/{card_id}/review"))
        .json(&fixtures::review_request("good", None))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .put(&format!("/api/cards/{card_id}"))
        .json(&serde_json::json!({ "question": "¿Qué?", "answer": "What" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["question"], "¿Qué?");
    assert_eq!(body["repetitions"], 1);
    assert_eq!(body["interval"], 1);
}

#[tokio::test]
async fn test_delete_card() {
    let ctx = TestContext::new();
    let deck_id = ctx.create_deck("Spanish").await;
    let card_id = ctx.add_cards(deck_id, 1).await[0];

    ctx.server
        .delete(&format!("/api/cards/{card_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    ctx.server
        .delete(&format!("/api/cards/{card_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
