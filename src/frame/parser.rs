//! Decoder for hexadecimal-encoded telemetry frames.
//!
//! Frame layout:
//!
//! ```text
//! [ 32-byte header ][ samples: total * channels * 4 bytes f32 LE ]
//! [ 4-byte LE event length ][ UTF-8 JSON event payload ]
//! [ 16-byte integrity digest ]
//! ```
//!
//! Decoding never fails to the caller. Each stage is fallible internally;
//! the top-level routine coalesces any failure into the richest partial
//! result still obtainable and records a diagnostic: a bad hex string or
//! truncated sample block degrades to nothing, a bad event payload keeps
//! the decoded samples, and a digest mismatch keeps everything.

use crate::frame::types::{
    Channel, Event, FrameHeader, Sample, DIGEST_LEN, HEADER_LEN, MIN_FRAME_LEN,
};
use sha2::{Digest, Sha256};

/// Failure kinds a frame can produce while decoding.
///
/// None of these reach the caller of [`parse_frame`]; they are logged and
/// coalesced into the documented partial results.
#[derive(Debug)]
pub enum FrameError {
    /// Invalid hex, truncated frame, or malformed numeric header field.
    Decode(String),
    /// Trailing digest does not match the frame body.
    ChecksumMismatch { expected: String, actual: String },
    /// Embedded event JSON is missing or malformed.
    EventPayload(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Decode(msg) => write!(f, "decode failed: {msg}"),
            FrameError::ChecksumMismatch { expected, actual } => {
                write!(f, "integrity digest mismatch (expected {expected}, got {actual})")
            }
            FrameError::EventPayload(msg) => write!(f, "event payload invalid: {msg}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Decode one hex-encoded frame into samples and events.
///
/// Never returns an error: failures degrade per stage (see module docs)
/// and are surfaced as `tracing` diagnostics.
pub fn parse_frame(hex_data: &str) -> (Vec<Sample>, Vec<Event>) {
    let raw = match decode_hex(hex_data) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("frame rejected: {e}");
            return (Vec::new(), Vec::new());
        }
    };

    let header = parse_header(&raw[..HEADER_LEN]);

    let samples = match parse_samples(&raw, &header) {
        Ok(samples) => samples,
        Err(e) => {
            tracing::warn!(session_id = %header.session_id, "frame rejected: {e}");
            return (Vec::new(), Vec::new());
        }
    };

    let event_start = HEADER_LEN + header.sample_block_len();
    let (events, footer_start) = match parse_event_block(&raw, event_start) {
        Ok((events, footer_start)) => (events, footer_start),
        Err(e) => {
            // Samples already decoded are kept; without a trustworthy event
            // block length the digest offset is unknown, so verification is
            // skipped as well.
            tracing::warn!(session_id = %header.session_id, "{e}");
            return (samples, Vec::new());
        }
    };

    if let Err(e) = verify_digest(&raw, footer_start) {
        tracing::warn!(session_id = %header.session_id, "{e}");
    }

    (samples, events)
}

/// Compute the 16-byte integrity digest for a frame body (every byte that
/// precedes the trailing digest): the truncated SHA-256 of the body.
pub fn frame_digest(body: &[u8]) -> [u8; DIGEST_LEN] {
    let digest = Sha256::digest(body);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&digest[..DIGEST_LEN]);
    out
}

/// Decode only the header of a hex frame, without touching the sample or
/// event blocks. Useful to the service layer for routing a frame to its
/// session before full decoding. None when the input is not at least a
/// minimal frame.
pub fn frame_header(hex_data: &str) -> Option<FrameHeader> {
    decode_hex(hex_data)
        .ok()
        .map(|raw| parse_header(&raw[..HEADER_LEN]))
}

/// Stage 1: hex string to bytes, with the minimum-length check.
fn decode_hex(hex_data: &str) -> Result<Vec<u8>, FrameError> {
    let raw = hex::decode(hex_data.trim())
        .map_err(|e| FrameError::Decode(format!("invalid hex input: {e}")))?;

    if raw.len() < MIN_FRAME_LEN {
        return Err(FrameError::Decode(format!(
            "frame too short: {} bytes, need at least {MIN_FRAME_LEN}",
            raw.len()
        )));
    }

    Ok(raw)
}

/// Stage 2: fixed-offset header decode. Infallible once 32 bytes exist;
/// the magic tag is carried through, not validated.
fn parse_header(header: &[u8]) -> FrameHeader {
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&header[0..4]);

    let session_id: String = header[21..32]
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();

    FrameHeader {
        magic,
        version: u16::from_le_bytes([header[4], header[5]]),
        channel_count: header[6],
        total_samples: u32::from_le_bytes([header[7], header[8], header[9], header[10]]),
        sampling_rate: u16::from_le_bytes([header[11], header[12]]),
        start_timestamp: f64::from_le_bytes(header[13..21].try_into().expect("8 header bytes")),
        session_id: session_id
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_string(),
    }
}

/// Stage 3: the sample block. Sample `i` on channel `c` sits at byte
/// offset `(i * channel_count + c) * 4` past the header and is stamped
/// `start_timestamp + i / sampling_rate`.
fn parse_samples(raw: &[u8], header: &FrameHeader) -> Result<Vec<Sample>, FrameError> {
    let data = &raw[HEADER_LEN..];
    let needed = header.sample_block_len();
    if data.len() < needed {
        return Err(FrameError::Decode(format!(
            "sample block truncated: {} bytes, header announced {needed}",
            data.len()
        )));
    }
    if header.sampling_rate == 0 && header.total_samples > 0 {
        return Err(FrameError::Decode("sampling rate is zero".to_string()));
    }

    let mut samples = Vec::with_capacity(header.total_samples as usize * header.channel_count as usize);
    let mut clamped = 0usize;

    for i in 0..header.total_samples as usize {
        let timestamp = header.start_timestamp + i as f64 / header.sampling_rate as f64;
        for c in 0..header.channel_count as usize {
            let offset = (i * header.channel_count as usize + c) * 4;
            let value = f32::from_le_bytes(data[offset..offset + 4].try_into().expect("4 sample bytes"));
            let channel = Channel::from_index(c as u8).unwrap_or_else(|| {
                clamped += 1;
                Channel::Fp1
            });
            samples.push(Sample::new(timestamp, channel, value));
        }
    }

    if clamped > 0 {
        tracing::warn!(
            session_id = %header.session_id,
            "{clamped} sample(s) carried an out-of-range channel index, attributed to fp1"
        );
    }

    Ok(samples)
}

/// Stage 4: the length-prefixed JSON event block. Returns the decoded
/// events and the offset where the trailing digest starts.
fn parse_event_block(raw: &[u8], event_start: usize) -> Result<(Vec<Event>, usize), FrameError> {
    let prefix_end = event_start + 4;
    if raw.len() < prefix_end {
        return Err(FrameError::EventPayload(
            "event block length prefix runs past the end of the frame".to_string(),
        ));
    }

    let payload_len =
        u32::from_le_bytes(raw[event_start..prefix_end].try_into().expect("4 length bytes")) as usize;
    let payload_end = prefix_end + payload_len;
    if raw.len() < payload_end {
        return Err(FrameError::EventPayload(format!(
            "event payload truncated: {payload_len} bytes announced, {} available",
            raw.len() - prefix_end
        )));
    }

    let events = parse_events(&raw[prefix_end..payload_end]);
    Ok((events, payload_end))
}

/// Wire shape of one entry in the embedded event document. The channel is
/// a raw integer index here; it maps through the same four-entry table as
/// sample channels, falling back to absent when out of range.
#[derive(serde::Deserialize)]
struct RawEvent {
    timestamp: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    channel: Option<i64>,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct EventDocument {
    #[serde(default)]
    events: Vec<RawEvent>,
}

fn parse_events(payload: &[u8]) -> Vec<Event> {
    let document: EventDocument = match serde_json::from_slice(payload) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("{}", FrameError::EventPayload(e.to_string()));
            return Vec::new();
        }
    };

    document
        .events
        .into_iter()
        .map(|raw| Event {
            timestamp: raw.timestamp,
            kind: raw.kind,
            channel: raw
                .channel
                .and_then(|idx| u8::try_from(idx).ok())
                .and_then(Channel::from_index),
            duration: raw.duration,
            metadata: raw.metadata,
        })
        .collect()
}

/// Stage 5: trailing digest comparison. A mismatch is reported but never
/// discards the decoded frame contents.
fn verify_digest(raw: &[u8], footer_start: usize) -> Result<(), FrameError> {
    let expected = frame_digest(&raw[..footer_start]);
    let footer = &raw[footer_start..raw.len().min(footer_start + DIGEST_LEN)];

    if footer == expected {
        Ok(())
    } else {
        Err(FrameError::ChecksumMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(footer),
        })
    }
}
