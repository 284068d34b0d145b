use super::error::TerminalError;

pub const SIGNATURE: u32 = 0x1911_3006;
pub const HEADER_LEN: usize = 20;

/// Flags value this client sends.
pub const CLIENT_FLAGS: u32 = 4;
/// Flags values seen from the two reference client platforms.
pub const ACCEPTED_FLAGS: [u32; 2] = [3, 4];

/// Upper bound on a response payload; anything larger is refused before
/// allocating.
pub const MAX_PAYLOAD_LEN: u32 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    StatusRequest = 6,
    StatusResponse = 7,
    MatchRequest = 8,
    MatchResponse = 9,
}

impl MessageType {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Fixed 20-byte big-endian frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: u32,
    pub length: u32,
    pub message_type: u32,
    pub flags: u32,
    pub timestamp: u32,
}

impl Header {
    pub fn request(message_type: MessageType, length: u32, timestamp: u32) -> Self {
        Self {
            signature: SIGNATURE,
            length,
            message_type: message_type.code(),
            flags: CLIENT_FLAGS,
            timestamp,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        let fields = [
            self.signature,
            self.length,
            self.message_type,
            self.flags,
            self.timestamp,
        ];
        for (chunk, field) in buf.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_be_bytes());
        }
        buf
    }

    pub fn decode(buf: &[u8; HEADER_LEN]) -> Self {
        let field = |i: usize| u32::from_be_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        Self {
            signature: field(0),
            length: field(4),
            message_type: field(8),
            flags: field(12),
            timestamp: field(16),
        }
    }

    /// Checks a response header against the expected message type.
    pub fn validate(&self, expected: MessageType) -> Result<(), TerminalError> {
        if self.signature != SIGNATURE {
            return Err(TerminalError::BadSignature(self.signature));
        }
        if self.message_type != expected.code() {
            return Err(TerminalError::UnexpectedType {
                expected: expected.code(),
                actual: self.message_type,
            });
        }
        if !ACCEPTED_FLAGS.contains(&self.flags) {
            return Err(TerminalError::UnsupportedFlags(self.flags));
        }
        if self.length > MAX_PAYLOAD_LEN {
            return Err(TerminalError::Oversized(self.length));
        }
        Ok(())
    }
}
