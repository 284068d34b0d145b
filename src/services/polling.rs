use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::leaderboard::Leaderboard;
use super::shutdown::Shutdown;
use crate::config::AppConfig;
use crate::device::Device;

/// Drives one task per device plus a snapshot task, all on the same tick.
pub struct PollingService {
    config: AppConfig,
    leaderboard: Arc<Leaderboard>,
    shutdown: Arc<Shutdown>,
}

impl PollingService {
    pub fn new(config: AppConfig, leaderboard: Arc<Leaderboard>, shutdown: Arc<Shutdown>) -> Self {
        Self {
            config,
            leaderboard,
            shutdown,
        }
    }

    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let tick = self.config.poller.tick();
        info!(
            "Polling {} device(s) every {} ms tick",
            self.config.devices.len(),
            tick.as_millis()
        );

        let mut handles: Vec<JoinHandle<()>> = self
            .config
            .devices
            .iter()
            .enumerate()
            .map(|(index, device_config)| {
                let offset = stagger_offset(index, device_config.poll_interval);
                let device = Device::new(device_config.clone(), &self.config.client, offset);
                tokio::spawn(run_device(
                    device,
                    tick,
                    self.leaderboard.clone(),
                    self.shutdown.clone(),
                ))
            })
            .collect();

        handles.push(tokio::spawn(run_snapshots(
            tick,
            self.leaderboard.clone(),
            self.shutdown.clone(),
        )));

        handles
    }
}

/// Spreads first polls over the interval so devices do not all fire on
/// the same tick.
pub fn stagger_offset(index: usize, poll_interval: u32) -> u32 {
    (index % (poll_interval as usize + 1)) as u32
}

async fn run_device(
    mut device: Device,
    tick: Duration,
    leaderboard: Arc<Leaderboard>,
    shutdown: Arc<Shutdown>,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    leaderboard
        .record_device(device.status(), device.raw_documents())
        .await;

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = interval.tick() => {}
        }

        let Some(outcome) = device.tick().await else {
            leaderboard
                .record_device(device.status(), device.raw_documents())
                .await;
            continue;
        };

        if let Some((definition, scores)) = &outcome.documents {
            if leaderboard.merge(definition, scores.as_ref()).await.is_none() {
                warn!("{}: match definition has no match id", device.id());
            }
        }
        leaderboard
            .record_device(device.status(), device.raw_documents())
            .await;

        if outcome.shutdown_requested {
            info!("{}: shutdown match loaded, stopping", device.id());
            shutdown.trigger();
        }
    }

    info!("{}: poller stopped", device.id());
}

async fn run_snapshots(tick: Duration, leaderboard: Arc<Leaderboard>, shutdown: Arc<Shutdown>) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = interval.tick() => {
                leaderboard.refresh().await;
            }
        }
    }
}
