use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{DeviceDetail, DeviceListResponse, ErrorResponse};

pub async fn get_devices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let devices = state.leaderboard.devices().await;
    let online = devices.iter().filter(|d| d.online).count();
    Json(DeviceListResponse { devices, online })
}

pub async fn get_device_detail(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
) -> impl IntoResponse {
    let status = state.leaderboard.device(&device_id).await;
    let documents = state.leaderboard.device_documents(&device_id).await;

    match (status, documents) {
        (Some(status), Some(documents)) => Json(DeviceDetail { status, documents }).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Device", &device_id)),
        )
            .into_response(),
    }
}
