use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::DisplaySettings;
use crate::device::{DeviceStatus, RawDocuments};
use crate::domain::{MatchDefinition, MatchScores};
use crate::merge::{MatchRegistry, MergeReport};
use crate::snapshot::{self, MatchView, Snapshot, StageResults};

struct DeviceEntry {
    status: DeviceStatus,
    documents: RawDocuments,
}

/// Shared state between the pollers and the read API.
///
/// Merges are serialized on the registry lock. Readers get either the last
/// published snapshot or a projection built while holding the same lock, so
/// they never observe a half-applied merge.
pub struct Leaderboard {
    registry: Mutex<MatchRegistry>,
    devices: RwLock<BTreeMap<String, DeviceEntry>>,
    published: RwLock<Arc<Snapshot>>,
}

impl Leaderboard {
    pub fn new(display: DisplaySettings) -> Self {
        Self {
            registry: Mutex::new(MatchRegistry::new(display)),
            devices: RwLock::new(BTreeMap::new()),
            published: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    pub async fn merge(
        &self,
        definition: &MatchDefinition,
        scores: Option<&MatchScores>,
    ) -> Option<MergeReport> {
        let mut registry = self.registry.lock().await;
        registry.merge_match(definition, scores)
    }

    pub async fn record_device(&self, status: DeviceStatus, documents: RawDocuments) {
        let mut devices = self.devices.write().await;
        devices.insert(status.id.clone(), DeviceEntry { status, documents });
    }

    /// Scores every match and publishes the result.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let devices = self.devices().await;
        let snapshot = {
            let registry = self.registry.lock().await;
            Arc::new(snapshot::build_snapshot(&registry, devices))
        };
        debug!(
            "Published snapshot: {} ranked, {} unranked",
            snapshot.matches.len(),
            snapshot.unranked.len()
        );
        *self.published.write().await = snapshot.clone();
        snapshot
    }

    /// Last published snapshot.
    pub async fn data(&self) -> Arc<Snapshot> {
        self.published.read().await.clone()
    }

    pub async fn match_data(&self, match_id: &str) -> Option<MatchView> {
        let registry = self.registry.lock().await;
        registry
            .get(match_id)
            .filter(|m| m.is_ranked())
            .map(snapshot::match_view)
    }

    pub async fn stage_data(&self, match_id: &str, stage_id: &str) -> Option<StageResults> {
        let registry = self.registry.lock().await;
        registry
            .get(match_id)
            .filter(|m| m.is_ranked())
            .and_then(|m| snapshot::stage_results(m, stage_id))
    }

    pub async fn devices(&self) -> Vec<DeviceStatus> {
        let devices = self.devices.read().await;
        devices.values().map(|entry| entry.status.clone()).collect()
    }

    pub async fn device(&self, device_id: &str) -> Option<DeviceStatus> {
        let devices = self.devices.read().await;
        devices.get(device_id).map(|entry| entry.status.clone())
    }

    pub async fn device_documents(&self, device_id: &str) -> Option<RawDocuments> {
        let devices = self.devices.read().await;
        devices.get(device_id).map(|entry| entry.documents.clone())
    }
}
