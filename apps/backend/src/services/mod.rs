//! Application services shared by the route handlers.

pub mod events;
pub mod sessions;
