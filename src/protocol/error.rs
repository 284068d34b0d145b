use std::time::Duration;

/// Coarse classification the poller and diagnostics care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Protocol,
    Payload,
}

/// Failure of one request against a scoring terminal.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("bad signature {0:#010x}")]
    BadSignature(u32),

    #[error("unexpected message type {actual} (expected {expected})")]
    UnexpectedType { expected: u32, actual: u32 },

    #[error("unsupported flags {0}")]
    UnsupportedFlags(u32),

    #[error("payload length {0} exceeds limit")]
    Oversized(u32),

    #[error("truncated payload: {0}")]
    Truncated(String),

    #[error("decompression failed: {0}")]
    Decompress(std::io::Error),

    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

impl TerminalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TerminalError::Io(_) | TerminalError::Timeout(_) => ErrorKind::Network,
            TerminalError::BadSignature(_)
            | TerminalError::UnexpectedType { .. }
            | TerminalError::UnsupportedFlags(_)
            | TerminalError::Oversized(_) => ErrorKind::Protocol,
            TerminalError::Truncated(_) | TerminalError::Decompress(_) | TerminalError::Json(_) => {
                ErrorKind::Payload
            }
        }
    }
}
