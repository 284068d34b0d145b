use flate2::read::ZlibDecoder;
use serde::de::DeserializeOwned;
use std::io::Read;

use super::error::TerminalError;
use crate::domain::{MatchDefinition, MatchScores};

/// Splits a match-response payload into its definition and optional scores.
///
/// Layout: `[u32 BE length L][L bytes compressed definition][rest: compressed scores]`.
/// An empty rest means the terminal has not recorded any score yet.
pub fn split_match_payload(
    payload: &[u8],
) -> Result<(MatchDefinition, Option<MatchScores>), TerminalError> {
    let (definition_block, scores_block) = split_blocks(payload)?;

    let definition = decode_block(definition_block)?;
    let scores = if scores_block.is_empty() {
        None
    } else {
        Some(decode_block(scores_block)?)
    };

    Ok((definition, scores))
}

fn split_blocks(payload: &[u8]) -> Result<(&[u8], &[u8]), TerminalError> {
    if payload.len() < 4 {
        return Err(TerminalError::Truncated(format!(
            "{} bytes, need at least 4",
            payload.len()
        )));
    }

    let declared = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    let rest = &payload[4..];

    if declared > rest.len() {
        return Err(TerminalError::Truncated(format!(
            "definition block declares {} bytes, {} available",
            declared,
            rest.len()
        )));
    }

    Ok(rest.split_at(declared))
}

fn decode_block<T: DeserializeOwned>(block: &[u8]) -> Result<T, TerminalError> {
    let json = decompress(block)?;
    Ok(serde_json::from_slice(&json)?)
}

fn decompress(block: &[u8]) -> Result<Vec<u8>, TerminalError> {
    let mut decoder = ZlibDecoder::new(block);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(TerminalError::Decompress)?;
    Ok(out)
}

/// Builds a match-response payload. Used by tests and fake terminals.
pub fn build_match_payload(definition: &[u8], scores: Option<&[u8]>) -> std::io::Result<Vec<u8>> {
    let definition_block = compress(definition)?;
    let mut payload = Vec::with_capacity(4 + definition_block.len());
    payload.extend_from_slice(&(definition_block.len() as u32).to_be_bytes());
    payload.extend_from_slice(&definition_block);
    if let Some(scores) = scores {
        payload.extend_from_slice(&compress(scores)?);
    }
    Ok(payload)
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"{"match_id": "m1", "match_name": "Club Night", "match_subtype": "scsa"}"#;
    const SCORES: &str = r#"{"match_scores": [{"stage_uuid": "st1", "stage_stagescores": []}]}"#;

    #[test]
    fn test_splits_definition_and_scores() {
        let payload = build_match_payload(DEFINITION.as_bytes(), Some(SCORES.as_bytes())).unwrap();

        let (definition, scores) = split_match_payload(&payload).unwrap();

        assert_eq!(definition.match_id, "m1");
        assert_eq!(definition.match_name, "Club Night");
        assert_eq!(scores.unwrap().match_scores[0].stage_uuid, "st1");
    }

    #[test]
    fn test_scores_absent_when_no_bytes_remain() {
        let payload = build_match_payload(DEFINITION.as_bytes(), None).unwrap();

        let (definition, scores) = split_match_payload(&payload).unwrap();

        assert_eq!(definition.match_id, "m1");
        assert!(scores.is_none());
    }

    #[test]
    fn test_declared_length_beyond_payload_is_truncated() {
        let mut payload = build_match_payload(DEFINITION.as_bytes(), None).unwrap();
        payload[0..4].copy_from_slice(&10_000u32.to_be_bytes());

        assert!(matches!(
            split_match_payload(&payload),
            Err(TerminalError::Truncated(_))
        ));
        assert!(matches!(
            split_match_payload(&[0, 0]),
            Err(TerminalError::Truncated(_))
        ));
    }

    #[test]
    fn test_garbage_block_fails_decompression() {
        let mut payload = 3u32.to_be_bytes().to_vec();
        payload.extend_from_slice(b"abc");

        assert!(matches!(
            split_match_payload(&payload),
            Err(TerminalError::Decompress(_))
        ));
    }

    #[test]
    fn test_non_json_block_is_a_document_error() {
        let payload = build_match_payload(b"not json", None).unwrap();

        assert!(matches!(split_match_payload(&payload), Err(TerminalError::Json(_))));
    }
}
