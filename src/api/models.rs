use serde::Serialize;

use crate::device::{DeviceStatus, RawDocuments};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn not_found(what: &str, id: &str) -> Self {
        Self {
            error: format!("{} '{}' not found", what, id),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceStatus>,
    pub online: usize,
}

/// Device status plus the last raw documents it reported.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    pub status: DeviceStatus,
    pub documents: RawDocuments,
}
