use std::path::{Path, PathBuf};

use crate::config::{ClientSettings, DeviceConfig, DeviceSource};
use crate::domain::{MatchDefinition, MatchScores, StatusDocument};
use crate::protocol::{TerminalClient, TerminalError};

/// Fetches a device's status and match documents.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Terminal(TerminalClient),
    File(FileSource),
}

impl DocumentSource {
    pub fn from_config(config: &DeviceConfig, identity: &ClientSettings) -> Self {
        match &config.source {
            DeviceSource::Terminal { address, port } => DocumentSource::Terminal(
                TerminalClient::new(address, *port, config.timeout(), identity.clone()),
            ),
            DeviceSource::File { definition, scores } => DocumentSource::File(FileSource {
                definition: definition.clone(),
                scores: scores.clone(),
            }),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Terminal(client) => client.endpoint(),
            DocumentSource::File(file) => format!("file:{}", file.definition.display()),
        }
    }

    pub async fn read_status(&self) -> Result<StatusDocument, TerminalError> {
        match self {
            DocumentSource::Terminal(client) => client.read_status().await,
            DocumentSource::File(file) => file.read_status().await,
        }
    }

    pub async fn read_match(
        &self,
    ) -> Result<(MatchDefinition, Option<MatchScores>), TerminalError> {
        match self {
            DocumentSource::Terminal(client) => client.read_match().await,
            DocumentSource::File(file) => file.read_match().await,
        }
    }
}

/// Replays documents saved from a terminal.
#[derive(Debug, Clone)]
pub struct FileSource {
    definition: PathBuf,
    scores: Option<PathBuf>,
}

impl FileSource {
    /// Files carry no status document, so one is derived from the definition.
    async fn read_status(&self) -> Result<StatusDocument, TerminalError> {
        let definition: MatchDefinition = read_json(&self.definition).await?;
        Ok(StatusDocument {
            ps_matchid: Some(definition.match_id),
            ps_matchname: Some(definition.match_name),
            ..StatusDocument::default()
        })
    }

    async fn read_match(&self) -> Result<(MatchDefinition, Option<MatchScores>), TerminalError> {
        let definition = read_json(&self.definition).await?;
        let scores = match &self.scores {
            Some(path) if path.exists() => Some(read_json(path).await?),
            _ => None,
        };
        Ok((definition, scores))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TerminalError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
