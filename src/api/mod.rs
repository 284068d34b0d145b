//! JSON read API over the leaderboard.

pub mod handlers;
pub mod models;
pub mod routes;
