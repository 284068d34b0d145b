use std::sync::Arc;

use crate::services::leaderboard::Leaderboard;

pub mod devices;
pub mod matches;

pub struct AppState {
    pub leaderboard: Arc<Leaderboard>,
}
