use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::handlers::{
    devices::{get_device_detail, get_devices},
    matches::{get_match, get_snapshot, get_stage},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/matches/:match_id", get(get_match))
        .route("/api/matches/:match_id/stages/:stage_id", get(get_stage))
        .route("/api/devices", get(get_devices))
        .route("/api/devices/:device_id", get(get_device_detail))
        .with_state(state)
}
