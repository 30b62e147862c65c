//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::json;

/// Midnight UTC on the given day.
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// RFC 3339 form used in query strings and request bodies.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generate `count` question/answer pairs.
pub fn sample_cards(count: usize) -> serde_json::Value {
    let cards: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "question": format!("Question {}?", i + 1),
                "answer": format!("Answer {}.", i + 1),
            })
        })
        .collect();
    json!({ "cards": cards })
}

/// Create a deck request body.
pub fn create_deck_request(name: &str) -> serde_json::Value {
    json!({ "name": name })
}

/// Create a review request body.
pub fn review_request(rating: &str, reviewed_at: Option<DateTime<Utc>>) -> serde_json::Value {
    match reviewed_at {
        Some(at) => json!({ "rating": rating, "reviewed_at": timestamp(at) }),
        None => json!({ "rating": rating }),
    }
}

/// Create a start session request body.
pub fn start_session_request(deck_id: i64, at: Option<DateTime<Utc>>) -> serde_json::Value {
    match at {
        Some(at) => json!({ "deck_id": deck_id, "at": timestamp(at) }),
        None => json!({ "deck_id": deck_id }),
    }
}
