//! Spaced repetition scheduling.
//!
//! Only the SM-2 variant is implemented. The scheduler is a pure function of
//! its inputs; callers persist the returned state themselves.

pub mod sm2;

pub use sm2::{advance, Sm2};
