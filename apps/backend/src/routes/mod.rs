//! HTTP route handlers

pub mod cards;
pub mod decks;
pub mod stats;
pub mod study;

use recall_core::Rating;

use crate::error::{ApiError, Result};

/// Strict rating parse for request bodies; unknown symbols are rejected.
pub(crate) fn parse_rating(value: &str) -> Result<Rating> {
    value.parse::<Rating>().map_err(|_| {
        tracing::warn!(rating = value, "rejected rating");
        ApiError::BadRequest(format!("Invalid rating: {value}"))
    })
}
