use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::Serialize;

use super::countdown::{Countdown, TickAction};
use super::source::DocumentSource;
use super::status::DeviceStatus;
use crate::config::{ClientSettings, DeviceConfig};
use crate::domain::{MatchDefinition, MatchScores, StatusDocument};
use crate::protocol::TerminalError;

/// Result of one network poll.
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// Documents from a successful match read, ready to merge
    pub documents: Option<(MatchDefinition, Option<MatchScores>)>,
    pub shutdown_requested: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RawDocuments {
    pub match_def: Option<MatchDefinition>,
    pub match_scores: Option<MatchScores>,
}

/// One polling target and its last-known raw documents.
pub struct Device {
    config: DeviceConfig,
    source: DocumentSource,
    countdown: Countdown,
    status: Option<StatusDocument>,
    definition: Option<MatchDefinition>,
    scores: Option<MatchScores>,
    online: bool,
    last_update: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl Device {
    pub fn new(config: DeviceConfig, identity: &ClientSettings, offset: u32) -> Self {
        let source = DocumentSource::from_config(&config, identity);
        Self::with_source(config, source, offset)
    }

    pub fn with_source(config: DeviceConfig, source: DocumentSource, offset: u32) -> Self {
        let countdown = Countdown::new(config.poll_interval, config.backoff, offset);
        Self {
            config,
            source,
            countdown,
            status: None,
            definition: None,
            scores: None,
            online: false,
            last_update: None,
            last_error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Advances the counters by one tick and polls when due.
    /// Returns `None` when no network call was made.
    pub async fn tick(&mut self) -> Option<PollOutcome> {
        match self.countdown.tick() {
            TickAction::Wait => None,
            TickAction::Throttled => {
                debug!("{}: backing off ({} left)", self.id(), self.countdown.backoff_counter());
                None
            }
            TickAction::Poll => Some(self.poll().await),
        }
    }

    /// Reads status then match. The two reads are independent: a failed
    /// status read does not skip the match read.
    pub async fn poll(&mut self) -> PollOutcome {
        let status = self.source.read_status().await;
        let matched = self.source.read_match().await;

        let mut outcome = PollOutcome::default();
        let mut failure: Option<TerminalError> = None;

        match status {
            Ok(status) => {
                outcome.shutdown_requested = self.is_shutdown_trigger(&status);
                self.status = Some(status);
            }
            Err(e) => failure = Some(e),
        }

        match matched {
            Ok((definition, scores)) => {
                self.definition = Some(definition.clone());
                self.scores = scores.clone();
                self.last_update = Some(Local::now());
                outcome.documents = Some((definition, scores));
            }
            Err(e) => failure = Some(e),
        }

        match failure {
            Some(e) => self.mark_offline(e),
            None => self.mark_online(),
        }

        outcome
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            id: self.config.id.clone(),
            name: self.display_name(),
            source: self.source.describe(),
            online: self.online,
            last_update: self
                .last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            poll_counter: self.countdown.poll_counter(),
            backoff_counter: self.countdown.backoff_counter(),
            last_error: self.last_error.clone(),
            match_id: self.definition.as_ref().map(|d| d.match_id.clone()),
            match_name: self.definition.as_ref().map(|d| d.match_name.clone()),
            match_subtype: self.definition.as_ref().map(|d| d.match_subtype.clone()),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Last raw documents exactly as the device reported them.
    pub fn raw_documents(&self) -> RawDocuments {
        RawDocuments {
            match_def: self.definition.clone(),
            match_scores: self.scores.clone(),
        }
    }

    // --- Helper Methods ---

    fn display_name(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.ps_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.id.clone())
    }

    fn is_shutdown_trigger(&self, status: &StatusDocument) -> bool {
        match (&self.config.shutdown_match, &status.ps_matchid) {
            (Some(trigger), Some(reported)) => trigger == reported,
            _ => false,
        }
    }

    fn mark_offline(&mut self, error: TerminalError) {
        if self.online {
            info!("{}: went offline", self.id());
        }
        warn!(
            "{}: poll of {} failed ({:?}): {}",
            self.id(),
            self.source.describe(),
            error.kind(),
            error
        );
        self.online = false;
        self.last_error = Some(error.to_string());
        self.countdown.back_off();
    }

    fn mark_online(&mut self) {
        if !self.online {
            info!("{}: online ({})", self.id(), self.source.describe());
        }
        self.online = true;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceSource, PollerSettings};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("practiscore_leaderboard_{}_{}", std::process::id(), name))
    }

    fn file_device(name: &str, poll_interval: u32, backoff: u32) -> (Device, PathBuf) {
        let path = temp_path(name);
        let mut config = DeviceConfig::with_source(
            "bay1",
            DeviceSource::File {
                definition: path.clone(),
                scores: None,
            },
            &PollerSettings::default(),
        );
        config.poll_interval = poll_interval;
        config.backoff = backoff;
        config.shutdown_match = Some("shutdown-now".to_string());
        (Device::new(config, &ClientSettings::default(), 0), path)
    }

    #[tokio::test]
    async fn test_failed_poll_backs_off_without_network_calls() {
        let (mut device, _missing) = file_device("poller_missing.json", 0, 3);

        let first = device.tick().await;
        assert!(first.is_some());
        assert!(!device.is_online());
        assert_eq!(device.status().backoff_counter, 3);

        for _ in 0..3 {
            assert!(device.tick().await.is_none());
        }
        assert!(device.tick().await.is_some());
    }

    #[tokio::test]
    async fn test_successful_poll_stores_documents_and_goes_online() {
        let (mut device, path) = file_device("poller_ok.json", 10, 3);
        std::fs::write(&path, r#"{"match_id": "m1", "match_name": "Club", "match_subtype": "idpa"}"#).unwrap();

        let outcome = device.tick().await.unwrap();

        let (definition, scores) = outcome.documents.unwrap();
        assert_eq!(definition.match_id, "m1");
        assert!(scores.is_none());
        assert!(!outcome.shutdown_requested);

        let status = device.status();
        assert!(status.online);
        assert!(status.last_update.is_some());
        assert_eq!(status.match_subtype.as_deref(), Some("idpa"));
        assert_eq!(status.poll_counter, 10);
        assert!(device.tick().await.is_none());

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_trigger_matches_status_match_id() {
        let (mut device, path) = file_device("poller_shutdown.json", 10, 3);
        std::fs::write(&path, r#"{"match_id": "shutdown-now"}"#).unwrap();

        let outcome = device.poll().await;

        assert!(outcome.shutdown_requested);

        std::fs::remove_file(path).unwrap();
    }
}
