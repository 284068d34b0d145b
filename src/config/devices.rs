use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::settings::PollerSettings;

pub const DEFAULT_PORT: u16 = 59613;

/// Where a device's documents come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceSource {
    /// A scoring terminal reached over the wire protocol
    Terminal {
        address: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    /// Definition and scores documents replayed from disk
    File {
        definition: PathBuf,
        #[serde(default)]
        scores: Option<PathBuf>,
    },
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// One polling target
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub source: DeviceSource,
    pub timeout_secs: u64,
    pub poll_interval: u32,
    pub backoff: u32,
    /// Match id that, when reported by the device, requests a shutdown
    #[serde(default)]
    pub shutdown_match: Option<String>,
}

impl DeviceConfig {
    pub fn with_source(id: &str, source: DeviceSource, settings: &PollerSettings) -> Self {
        Self {
            id: id.to_string(),
            source,
            timeout_secs: settings.timeout_secs,
            poll_interval: settings.poll_interval,
            backoff: settings.backoff,
            shutdown_match: None,
        }
    }

    /// Parses `ID=HOST[:PORT]`, `HOST[:PORT]` or `ID=file:DEF_PATH[,SCORES_PATH]`.
    pub fn parse(spec: &str, settings: &PollerSettings) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            bail!("Empty device specification");
        }

        let (id, target) = match spec.split_once('=') {
            Some((id, target)) => (id.trim(), target.trim()),
            None => (spec, spec),
        };

        if id.is_empty() || target.is_empty() {
            bail!("Invalid device specification: {}", spec);
        }

        let source = if let Some(paths) = target.strip_prefix("file:") {
            parse_file_source(paths)?
        } else {
            parse_terminal_source(target)
                .with_context(|| format!("Invalid device specification: {}", spec))?
        };

        Ok(Self::with_source(id, source, settings))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_terminal_source(target: &str) -> Result<DeviceSource> {
    let (address, port) = match target.rsplit_once(':') {
        Some((address, port)) => {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("Invalid port: {}", port))?;
            (address, port)
        }
        None => (target, DEFAULT_PORT),
    };

    if address.is_empty() {
        bail!("Missing address");
    }

    Ok(DeviceSource::Terminal {
        address: address.to_string(),
        port,
    })
}

fn parse_file_source(paths: &str) -> Result<DeviceSource> {
    let mut parts = paths.splitn(2, ',');
    let definition = parts.next().unwrap_or_default().trim();
    if definition.is_empty() {
        bail!("File device needs a definition path");
    }
    let scores = parts
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    Ok(DeviceSource::File {
        definition: PathBuf::from(definition),
        scores,
    })
}
