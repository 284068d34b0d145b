use serde::Serialize;

/// Discipline-agnostic view of one device, exposed in the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub id: String,
    pub name: String,
    pub source: String,
    pub online: bool,
    pub last_update: Option<String>,
    pub poll_counter: i64,
    pub backoff_counter: i64,
    pub last_error: Option<String>,
    /// Match last reported by the device, including ones with an
    /// unrecognised discipline that never reach the ranked views.
    pub match_id: Option<String>,
    pub match_name: Option<String>,
    pub match_subtype: Option<String>,
}
