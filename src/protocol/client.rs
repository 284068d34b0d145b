use chrono::Local;
use log::debug;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::error::TerminalError;
use super::frame::{Header, MessageType, HEADER_LEN};
use super::payload::split_match_payload;
use crate::config::settings::ClientSettings;
use crate::domain::{MatchDefinition, MatchScores, StatusDocument, StatusRequest};

/// Client for one scoring terminal.
///
/// Every request opens a fresh connection and closes it afterwards; the
/// whole exchange runs under the configured timeout.
#[derive(Debug, Clone)]
pub struct TerminalClient {
    host: String,
    port: u16,
    timeout: Duration,
    identity: ClientSettings,
}

impl TerminalClient {
    pub fn new(host: &str, port: u16, timeout: Duration, identity: ClientSettings) -> Self {
        Self {
            host: host.to_string(),
            port,
            timeout,
            identity,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Sends a status request and returns the terminal's status document.
    pub async fn read_status(&self) -> Result<StatusDocument, TerminalError> {
        self.with_timeout(self.exchange_status()).await
    }

    /// Requests the loaded match and returns its definition and scores.
    pub async fn read_match(
        &self,
    ) -> Result<(MatchDefinition, Option<MatchScores>), TerminalError> {
        self.with_timeout(self.exchange_match()).await
    }

    // --- Helper Methods ---

    async fn exchange_status(&self) -> Result<StatusDocument, TerminalError> {
        let mut stream = self.connect().await?;
        let local_host = stream.local_addr()?.ip().to_string();
        let body = serde_json::to_vec(&self.build_status_request(local_host))?;

        let header = Header::request(MessageType::StatusRequest, body.len() as u32, unix_now());
        let mut frame = header.encode().to_vec();
        frame.extend_from_slice(&body);
        stream.write_all(&frame).await?;

        let payload = read_response(&mut stream, MessageType::StatusResponse).await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    async fn exchange_match(
        &self,
    ) -> Result<(MatchDefinition, Option<MatchScores>), TerminalError> {
        let mut stream = self.connect().await?;

        let header = Header::request(MessageType::MatchRequest, 0, unix_now());
        stream.write_all(&header.encode()).await?;

        let payload = read_response(&mut stream, MessageType::MatchResponse).await?;
        debug!("{}: match payload {} bytes", self.endpoint(), payload.len());
        split_match_payload(&payload)
    }

    async fn connect(&self) -> Result<TcpStream, TerminalError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    async fn with_timeout<T, F>(&self, request: F) -> Result<T, TerminalError>
    where
        F: Future<Output = Result<T, TerminalError>>,
    {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| TerminalError::Timeout(self.timeout))?
    }

    fn build_status_request(&self, local_host: String) -> StatusRequest {
        StatusRequest {
            ps_name: self.identity.name.clone(),
            ps_port: self.port,
            ps_host: local_host,
            ps_matchname: self.identity.name.clone(),
            ps_matchid: self.identity.unique_id.clone(),
            ps_modified: Local::now().format("%Y-%m-%d %H:%M:%S.000").to_string(),
            ps_battery: 100,
            ps_uniqueid: self.identity.unique_id.clone(),
        }
    }
}

/// Reads one framed response. A partially read response is dropped with the
/// connection, never returned.
async fn read_response(
    stream: &mut TcpStream,
    expected: MessageType,
) -> Result<Vec<u8>, TerminalError> {
    let mut raw_header = [0u8; HEADER_LEN];
    stream.read_exact(&mut raw_header).await?;

    let header = Header::decode(&raw_header);
    header.validate(expected)?;

    let mut payload = vec![0u8; header.length as usize];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
