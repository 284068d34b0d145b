pub mod api;
pub mod cli;
pub mod config;
pub mod device;
pub mod domain;
pub mod merge;
pub mod protocol;
pub mod scoring;
pub mod services;
pub mod snapshot;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use log::{info, warn};
use std::sync::Arc;

use cli::Cli;

use crate::cli::Command;
use crate::config::{AppConfig, ClientSettings, DeviceConfig, DisplaySettings, PollerSettings};
use crate::device::Device;
use crate::merge::MatchRegistry;
use crate::services::{Leaderboard, PollingService, ServerService, Shutdown};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Serve {
            port,
            devices,
            poll_interval,
            backoff,
            timeout,
            tick_ms,
            shutdown_match,
            division_names,
            stage_names,
            client_name,
        } => {
            let poller = PollerSettings {
                tick_ms,
                poll_interval,
                backoff,
                timeout_secs: timeout,
            };
            let mut config = AppConfig {
                poller,
                display: DisplaySettings {
                    division_names: division_names.into_iter().collect(),
                    stage_names: stage_names.into_iter().collect(),
                },
                ..AppConfig::new()
            };
            if let Some(name) = client_name {
                config.client.name = name;
            }

            let devices = devices
                .iter()
                .map(|spec| {
                    DeviceConfig::parse(spec, &config.poller).map(|mut device| {
                        device.shutdown_match = shutdown_match.clone();
                        device
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            handle_serve(port, config.with_devices(devices))
        }
        Command::Inspect { device, timeout } => handle_inspect(&device, timeout),
        Command::Completions { shell } => handle_completions(shell),
    }
}

pub fn handle_serve(port: u16, config: AppConfig) -> Result<()> {
    if config.devices.is_empty() {
        warn!("No devices configured, the leaderboard will stay empty");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let leaderboard = Arc::new(Leaderboard::new(config.display.clone()));
        let shutdown = Arc::new(Shutdown::new());

        let on_ctrl_c = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, shutting down");
                on_ctrl_c.trigger();
            }
        });

        let handles =
            PollingService::new(config, leaderboard.clone(), shutdown.clone()).spawn();
        let served = ServerService::new(port, leaderboard, shutdown.clone())
            .run()
            .await;

        // Pollers must stop even when the server failed to start.
        shutdown.trigger();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Poller task failed: {}", e);
            }
        }

        served
    })
}

pub fn handle_inspect(spec: &str, timeout: u64) -> Result<()> {
    let settings = PollerSettings {
        timeout_secs: timeout,
        ..PollerSettings::default()
    };
    let config = DeviceConfig::parse(spec, &settings)
        .with_context(|| format!("Cannot inspect '{}'", spec))?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut device = Device::new(config, &ClientSettings::default(), 0);
        let outcome = device.poll().await;
        let status = device.status();

        println!("{} {}", "Device:".bold(), status.name);
        println!("{} {}", "Source:".bold(), status.source);
        if status.online {
            println!("{} {}", "Status:".bold(), "online".green());
        } else {
            println!("{} {}", "Status:".bold(), "offline".red());
        }
        if let Some(error) = &status.last_error {
            println!("{} {}", "Error:".bold(), error.red());
        }

        let Some((definition, scores)) = outcome.documents else {
            anyhow::bail!("No match documents received from '{}'", spec);
        };

        let mut registry = MatchRegistry::new(DisplaySettings::default());
        registry.merge_match(&definition, scores.as_ref());
        let Some(found) = registry.get(&definition.match_id) else {
            println!("{}", "Match definition has no match id".yellow());
            return Ok(());
        };

        println!(
            "{} {} ({})",
            "Match:".bold(),
            found.name,
            found.subtype.cyan()
        );
        println!(
            "{} {} shooters, {} stages",
            "Entries:".bold(),
            found.active_shooters().len(),
            found.active_stages().len()
        );

        if !found.is_ranked() {
            println!("{}", "Unrecognised discipline, not ranked".yellow());
            return Ok(());
        }

        let view = snapshot::match_view(found);
        for result in view.combined.iter().take(10) {
            println!(
                "{:>4}. {:<32} {:<12} {}",
                result.place,
                result.name,
                result.short_division,
                result.total_display.green()
            );
        }
        Ok(())
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
