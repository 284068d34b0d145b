use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::devices::DeviceConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Length of one scheduler tick
    pub tick_ms: u64,
    /// Ticks between polls of a healthy device
    pub poll_interval: u32,
    /// Poll intervals a failed device sits out
    pub backoff: u32,
    pub timeout_secs: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            poll_interval: 10,
            backoff: 6,
            timeout_secs: 5,
        }
    }
}

impl PollerSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Identity this kiosk announces in status requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub name: String,
    pub unique_id: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            name: "practiscore-leaderboard".to_string(),
            unique_id: "practiscore-leaderboard".to_string(),
        }
    }
}

/// Display-name substitution tables for divisions and stages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub division_names: BTreeMap<String, String>,
    pub stage_names: BTreeMap<String, String>,
}

impl DisplaySettings {
    pub fn short_division(&self, division: &str) -> String {
        substitute(&self.division_names, division)
    }

    pub fn short_stage_name(&self, name: &str) -> String {
        substitute(&self.stage_names, name)
    }
}

fn substitute(table: &BTreeMap<String, String>, name: &str) -> String {
    table.get(name).cloned().unwrap_or_else(|| name.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub poller: PollerSettings,
    pub client: ClientSettings,
    pub display: DisplaySettings,
    pub devices: Vec<DeviceConfig>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(mut self, devices: Vec<DeviceConfig>) -> Self {
        self.devices = devices;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_falls_back_to_given_name() {
        let mut display = DisplaySettings::default();
        display
            .division_names
            .insert("Rimfire Optic".to_string(), "RO".to_string());

        assert_eq!(display.short_division("Rimfire Optic"), "RO");
        assert_eq!(display.short_division("Centrefire"), "Centrefire");
        assert_eq!(display.short_stage_name("W1 CB: The Pendulum"), "W1 CB: The Pendulum");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"poller": {"backoff": 3}, "display": {"stage_names": {"a": "b"}}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.poller.backoff, 3);
        assert_eq!(config.poller.poll_interval, 10);
        assert_eq!(config.display.short_stage_name("a"), "b");
        assert!(config.devices.is_empty());
    }
}
